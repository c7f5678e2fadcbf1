// 1.0: all the primitives live here. nothing in the engine works without these types.
// identities, assets, amounts, deltas, timestamps. each is a newtype so the compiler
// catches type mixups. the zero id is reserved as the "empty" sentinel (like a zero
// address) so configuration can reject unset references.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl AccountId {
    pub const EMPTY: AccountId = AccountId(0);

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

impl AssetId {
    pub const EMPTY: AssetId = AssetId(0);

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", self.0)
    }
}

// 1.1: non-negative asset quantity. borrowable/borrowed/repaid counters and every
// transfer amount use this. construction rejects negatives, subtraction is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(value >= Decimal::ZERO);
        Self(value)
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, other: Amount) -> Self {
        Self(self.0 + other.0)
    }

    // None when other > self. the engine treats that as an insufficient balance.
    #[must_use]
    pub fn checked_sub(&self, other: Amount) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }

    // floors at zero. used for the outstanding-balance clamp.
    pub fn saturating_sub(&self, other: Amount) -> Self {
        if other.0 > self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, a| acc.add(a))
    }
}

// 1.2: signed adjustment to the borrowable amount. positive pulls from the vault,
// negative pushes back. mirrors SignedSize in spirit: sign carries direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAmount(Decimal);

impl SignedAmount {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs(&self) -> Amount {
        Amount::new_unchecked(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= Decimal::ZERO {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// 1.3: opaque loan tag. informational only, no semantic effect. bounded to 32 bytes
// so it behaves like a fixed-size field rather than unbounded storage.
pub const DESCRIPTION_MAX_BYTES: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description(String);

impl Description {
    pub fn new(tag: &str) -> Self {
        let mut end = tag.len().min(DESCRIPTION_MAX_BYTES);
        while !tag.is_char_boundary(end) {
            end -= 1;
        }
        Self(tag[..end].to_string())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.4: millisecond timestamp for event stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}
