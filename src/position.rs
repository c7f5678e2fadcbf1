// 6.0: the position ledger. one LoanPosition per engine instance, created logically
// at configuration. 6.2 has the valuation math; the face-value clamp is the part
// that is easy to get wrong, so it lives here as pure functions with direct tests.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount, AssetId, Description};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPosition {
    borrower: Option<AccountId>,
    loan_asset: Option<AssetId>,
    description: Description,
    borrowable_amount: Amount,
    total_borrowed: Amount,
    total_repaid: Amount,
    closed: bool,
    configured: bool,
}

impl LoanPosition {
    pub fn new() -> Self {
        Self::default()
    }

    // 6.1: lifecycle. configuration is the creation event; closure is logical
    // retirement. both are one-way.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn borrower(&self) -> Option<AccountId> {
        self.borrower
    }

    pub fn loan_asset(&self) -> Option<AssetId> {
        self.loan_asset
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn borrowable_amount(&self) -> Amount {
        self.borrowable_amount
    }

    pub fn total_borrowed(&self) -> Amount {
        self.total_borrowed
    }

    pub fn total_repaid(&self) -> Amount {
        self.total_repaid
    }

    pub(crate) fn configure(
        &mut self,
        borrower: AccountId,
        loan_asset: AssetId,
        description: Description,
    ) {
        debug_assert!(!self.configured);
        self.borrower = Some(borrower);
        self.loan_asset = Some(loan_asset);
        self.description = description;
        self.configured = true;
    }

    pub(crate) fn set_borrowable_amount(&mut self, amount: Amount) {
        self.borrowable_amount = amount;
    }

    pub(crate) fn add_borrowed(&mut self, amount: Amount) {
        self.total_borrowed = self.total_borrowed.add(amount);
    }

    pub(crate) fn add_repaid(&mut self, amount: Amount) {
        self.total_repaid = self.total_repaid.add(amount);
    }

    pub(crate) fn mark_closed(&mut self) {
        debug_assert!(self.borrowable_amount.is_zero());
        self.closed = true;
    }

    // 6.2: outstanding = borrowed - repaid, floored at zero. over-repayment is
    // allowed, so the raw difference can go negative.
    pub fn outstanding(&self) -> Amount {
        self.total_borrowed.saturating_sub(self.total_repaid)
    }

    // face value before the closed clamp: outstanding debt plus undrawn principal.
    pub fn face_value(&self) -> Amount {
        self.outstanding().add(self.borrowable_amount)
    }

    // 6.3: contribution to managed value. closed positions and zero face value
    // report nothing at all; a present zero-amount entry is never produced.
    pub fn managed_assets(&self) -> Option<(AssetId, Amount)> {
        if self.closed {
            return None;
        }
        let face_value = self.face_value();
        if face_value.is_zero() {
            return None;
        }
        // loan_asset is always set once face_value can be nonzero
        self.loan_asset.map(|asset| (asset, face_value))
    }

    // invariant set from the data model. exercised by the property tests after
    // every committed operation.
    pub fn check_invariants(&self) -> bool {
        if !self.configured {
            return self.borrower.is_none()
                && self.loan_asset.is_none()
                && self.borrowable_amount.is_zero()
                && self.total_borrowed.is_zero()
                && self.total_repaid.is_zero()
                && !self.closed;
        }
        let identities_set = matches!(self.borrower, Some(b) if !b.is_empty())
            && matches!(self.loan_asset, Some(a) if !a.is_empty());
        let closed_ok = !self.closed || self.borrowable_amount.is_zero();
        identities_set && closed_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn amt(v: i64) -> Amount {
        Amount::new_unchecked(Decimal::from(v))
    }

    fn configured_position() -> LoanPosition {
        let mut position = LoanPosition::new();
        position.configure(AccountId(2), AssetId(3), Description::new("test"));
        position
    }

    #[test]
    fn unconfigured_invariants() {
        let position = LoanPosition::new();
        assert!(!position.is_configured());
        assert!(position.check_invariants());
        assert_eq!(position.managed_assets(), None);
    }

    #[test]
    fn face_value_counts_outstanding_plus_undrawn() {
        let mut position = configured_position();
        position.set_borrowable_amount(amt(300));
        position.add_borrowed(amt(100));
        position.add_repaid(amt(25));

        assert_eq!(position.outstanding(), amt(75));
        assert_eq!(position.face_value(), amt(375));
        assert_eq!(position.managed_assets(), Some((AssetId(3), amt(375))));
    }

    #[test]
    fn over_repayment_floors_outstanding_at_zero() {
        let mut position = configured_position();
        position.add_repaid(amt(123));

        assert_eq!(position.outstanding(), Amount::ZERO);
        assert_eq!(position.face_value(), Amount::ZERO);
        // never a present zero-amount entry
        assert_eq!(position.managed_assets(), None);
    }

    #[test]
    fn closed_position_reports_nothing() {
        let mut position = configured_position();
        position.set_borrowable_amount(amt(100));
        position.add_borrowed(amt(25));
        position.set_borrowable_amount(Amount::ZERO);
        position.mark_closed();

        // outstanding debt remains, but a closed position contributes zero
        assert_eq!(position.outstanding(), amt(25));
        assert_eq!(position.managed_assets(), None);
        assert!(position.check_invariants());
    }

    #[test]
    fn zero_amount_shell_loan() {
        let position = configured_position();
        assert!(position.is_configured());
        assert_eq!(position.managed_assets(), None);
        assert!(position.check_invariants());
    }
}
