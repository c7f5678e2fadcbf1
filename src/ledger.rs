// 2.0 ledger.rs: the transfer gateway seam. the engine never owns balances beyond
// its custody account; everything moves through this trait. InMemoryLedger is the
// MOCKED implementation: just balance changes, no real token transfers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{AccountId, Amount, AssetId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient balance of {asset} in {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: AssetId,
        holder: AccountId,
        requested: Amount,
        available: Amount,
    },
}

// 2.1: gateway contract. a conforming implementation settles each call fully or
// returns an error with no balance change.
pub trait TransferGateway {
    fn balance_of(&self, asset: AssetId, holder: AccountId) -> Amount;

    fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    // converts a holder's native-currency balance into the canonical wrapped asset,
    // in place. returns the wrapped asset id.
    fn wrap_native(&mut self, holder: AccountId, amount: Amount) -> Result<AssetId, LedgerError>;

    fn native_asset(&self) -> AssetId;

    fn wrapped_native_asset(&self) -> AssetId;
}

// 2.2: in-memory ledger for tests and simulation. balances keyed by (asset, holder).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryLedger {
    balances: HashMap<(AssetId, AccountId), Decimal>,
    native: AssetId,
    wrapped_native: AssetId,
}

impl InMemoryLedger {
    pub fn new(native: AssetId, wrapped_native: AssetId) -> Self {
        debug_assert!(!native.is_empty() && !wrapped_native.is_empty());
        debug_assert!(native != wrapped_native);
        Self {
            balances: HashMap::new(),
            native,
            wrapped_native,
        }
    }

    // test/sim seeding. not part of the gateway contract.
    pub fn mint(&mut self, asset: AssetId, holder: AccountId, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        *self.balances.entry((asset, holder)).or_insert(Decimal::ZERO) += amount.value();
    }

    pub fn total_supply(&self, asset: AssetId) -> Amount {
        let total = self
            .balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .map(|(_, v)| *v)
            .sum();
        Amount::new_unchecked(total)
    }

    fn debit(
        &mut self,
        asset: AssetId,
        holder: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let balance = self.balance_of(asset, holder);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                asset,
                holder,
                requested: amount,
                available: balance,
            })?;

        if remaining.is_zero() {
            self.balances.remove(&(asset, holder));
        } else {
            self.balances.insert((asset, holder), remaining.value());
        }
        Ok(())
    }

    fn credit(&mut self, asset: AssetId, holder: AccountId, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        *self.balances.entry((asset, holder)).or_insert(Decimal::ZERO) += amount.value();
    }
}

impl TransferGateway for InMemoryLedger {
    fn balance_of(&self, asset: AssetId, holder: AccountId) -> Amount {
        Amount::new_unchecked(
            self.balances
                .get(&(asset, holder))
                .copied()
                .unwrap_or(Decimal::ZERO),
        )
    }

    fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount);
        Ok(())
    }

    fn wrap_native(&mut self, holder: AccountId, amount: Amount) -> Result<AssetId, LedgerError> {
        if !amount.is_zero() {
            self.debit(self.native, holder, amount)?;
            self.credit(self.wrapped_native, holder, amount);
        }
        Ok(self.wrapped_native)
    }

    fn native_asset(&self) -> AssetId {
        self.native
    }

    fn wrapped_native_asset(&self) -> AssetId {
        self.wrapped_native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const NATIVE: AssetId = AssetId(1);
    const WNATIVE: AssetId = AssetId(2);
    const USDC: AssetId = AssetId(3);

    fn amt(v: i64) -> Amount {
        Amount::new_unchecked(Decimal::from(v))
    }

    #[test]
    fn transfer_moves_balance() {
        let mut ledger = InMemoryLedger::new(NATIVE, WNATIVE);
        ledger.mint(USDC, AccountId(1), amt(1000));

        ledger.transfer(USDC, AccountId(1), AccountId(2), amt(400)).unwrap();

        assert_eq!(ledger.balance_of(USDC, AccountId(1)), amt(600));
        assert_eq!(ledger.balance_of(USDC, AccountId(2)), amt(400));
        assert_eq!(ledger.total_supply(USDC), amt(1000));
    }

    #[test]
    fn transfer_insufficient_balance() {
        let mut ledger = InMemoryLedger::new(NATIVE, WNATIVE);
        ledger.mint(USDC, AccountId(1), amt(100));

        let result = ledger.transfer(USDC, AccountId(1), AccountId(2), amt(101));

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { requested, available, .. })
                if requested == amt(101) && available == amt(100)
        ));
        // failed transfer leaves balances untouched
        assert_eq!(ledger.balance_of(USDC, AccountId(1)), amt(100));
        assert_eq!(ledger.balance_of(USDC, AccountId(2)), Amount::ZERO);
    }

    #[test]
    fn zero_transfer_is_noop() {
        let mut ledger = InMemoryLedger::new(NATIVE, WNATIVE);
        ledger.transfer(USDC, AccountId(1), AccountId(2), Amount::ZERO).unwrap();
        assert_eq!(ledger.balance_of(USDC, AccountId(2)), Amount::ZERO);
    }

    #[test]
    fn wrap_native_converts_in_place() {
        let mut ledger = InMemoryLedger::new(NATIVE, WNATIVE);
        ledger.mint(NATIVE, AccountId(1), amt(123));

        let wrapped = ledger.wrap_native(AccountId(1), amt(123)).unwrap();

        assert_eq!(wrapped, WNATIVE);
        assert_eq!(ledger.balance_of(NATIVE, AccountId(1)), Amount::ZERO);
        assert_eq!(ledger.balance_of(WNATIVE, AccountId(1)), amt(123));
    }

    #[test]
    fn wrap_more_than_held_fails() {
        let mut ledger = InMemoryLedger::new(NATIVE, WNATIVE);
        ledger.mint(NATIVE, AccountId(1), amt(50));

        let result = ledger.wrap_native(AccountId(1), amt(51));
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
    }

    #[test]
    fn fractional_amounts() {
        let mut ledger = InMemoryLedger::new(NATIVE, WNATIVE);
        ledger.mint(USDC, AccountId(1), Amount::new_unchecked(dec!(0.75)));

        ledger
            .transfer(USDC, AccountId(1), AccountId(2), Amount::new_unchecked(dec!(0.25)))
            .unwrap();

        assert_eq!(ledger.balance_of(USDC, AccountId(1)).value(), dec!(0.50));
        assert_eq!(ledger.balance_of(USDC, AccountId(2)).value(), dec!(0.25));
    }
}
