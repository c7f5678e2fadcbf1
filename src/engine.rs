// 7.0 engine.rs: the loan engine. one engine per loan, one loan per asset. holds
// the position ledger, the transfer gateway, the authorization gate, and the
// optional accounting module, plus the audit event log.
//
// every operation is atomic: validations run first, bookkeeping is staged before
// any gateway call (so a reentrant observer sees an already-progressed position),
// and a gateway failure restores the staged position before the error propagates.

use crate::accounting::{AccountingModule, ModuleError};
use crate::auth::AuthorizationGate;
use crate::config::EngineConfig;
use crate::events::{
    BorrowableAmountUpdatedEvent, Event, EventId, EventPayload, LoanClosedEvent,
    LoanConfiguredEvent, TotalBorrowedUpdatedEvent, TotalRepaidUpdatedEvent,
};
use crate::ledger::{LedgerError, TransferGateway};
use crate::position::LoanPosition;
use crate::types::{AccountId, Amount, AssetId, Description, SignedAmount, Timestamp};

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Unauthorized caller {0}")]
    Unauthorized(AccountId),

    #[error("Already configured")]
    AlreadyConfigured,

    #[error("Not configured")]
    NotConfigured,

    #[error("Loan closed")]
    LoanClosed,

    #[error("Empty borrower")]
    EmptyBorrower,

    #[error("Empty loan asset")]
    EmptyLoanAsset,

    #[error("Empty amount")]
    EmptyAmount,

    #[error("Nothing to repay")]
    NothingToRepay,

    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Transfer error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Repayment request: a finite amount taken at face value (over-repayment is
/// accepted), or the full outstanding balance as of this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepayAmount {
    Exact(Amount),
    Max,
}

/// Everything `configure_loan` needs. The accounting module, if any, is handed
/// over here and is immutable for the life of the loan.
pub struct LoanTerms {
    pub borrower: AccountId,
    pub loan_asset: AssetId,
    pub borrowable_amount: Amount,
    pub accounting_module: Option<Box<dyn AccountingModule>>,
    pub module_config_data: Vec<u8>,
    pub description: Description,
}

impl LoanTerms {
    pub fn new(borrower: AccountId, loan_asset: AssetId, borrowable_amount: Amount) -> Self {
        Self {
            borrower,
            loan_asset,
            borrowable_amount,
            accounting_module: None,
            module_config_data: Vec::new(),
            description: Description::empty(),
        }
    }

    pub fn with_description(mut self, tag: &str) -> Self {
        self.description = Description::new(tag);
        self
    }

    pub fn with_accounting_module(
        mut self,
        module: Box<dyn AccountingModule>,
        config_data: Vec<u8>,
    ) -> Self {
        self.accounting_module = Some(module);
        self.module_config_data = config_data;
        self
    }
}

// 7.1: the engine struct. custody is the position's own account on the gateway;
// vault is the owning fund's account. both are fixed at construction.
pub struct LoanEngine<G: TransferGateway> {
    config: EngineConfig,
    position: LoanPosition,
    gateway: G,
    gate: Box<dyn AuthorizationGate>,
    module: Option<Box<dyn AccountingModule>>,
    custody: AccountId,
    vault: AccountId,
    events: Vec<Event>,
    next_event_id: u64,
    current_time: Timestamp,
}

impl<G: TransferGateway> LoanEngine<G> {
    pub fn new(
        config: EngineConfig,
        gateway: G,
        gate: Box<dyn AuthorizationGate>,
        custody: AccountId,
        vault: AccountId,
    ) -> Self {
        debug_assert!(!custody.is_empty() && !vault.is_empty() && custody != vault);
        Self {
            config,
            position: LoanPosition::new(),
            gateway,
            gate,
            module: None,
            custody,
            vault,
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    // 7.2: configuration. the creation event for the position. exactly one call
    // ever succeeds; every later call fails identically regardless of arguments.
    pub fn configure_loan(
        &mut self,
        caller: AccountId,
        terms: LoanTerms,
    ) -> Result<(), EngineError> {
        self.require_manager(caller)?;
        if self.position.is_configured() {
            return Err(EngineError::AlreadyConfigured);
        }
        // identity validation applies even when the requested amount is zero
        if terms.borrower.is_empty() {
            return Err(EngineError::EmptyBorrower);
        }
        if terms.loan_asset.is_empty() {
            return Err(EngineError::EmptyLoanAsset);
        }

        let snapshot = self.position.clone();
        self.position
            .configure(terms.borrower, terms.loan_asset, terms.description.clone());
        self.position.set_borrowable_amount(terms.borrowable_amount);

        // module hook runs before the pull so a rejected config leaves the
        // ledger untouched; the module itself is only kept on full commit
        let mut module = terms.accounting_module;
        if let Some(m) = module.as_mut() {
            if let Err(e) = m.on_configure(&terms.module_config_data) {
                self.position = snapshot;
                return Err(e.into());
            }
        }

        if !terms.borrowable_amount.is_zero() {
            if let Err(e) = self.gateway.transfer(
                terms.loan_asset,
                self.vault,
                self.custody,
                terms.borrowable_amount,
            ) {
                self.position = snapshot;
                return Err(e.into());
            }
        }

        let has_module = module.is_some();
        self.module = module;

        self.emit_event(EventPayload::LoanConfigured(LoanConfiguredEvent {
            borrower: terms.borrower,
            loan_asset: terms.loan_asset,
            has_accounting_module: has_module,
            description: terms.description,
        }));
        if !terms.borrowable_amount.is_zero() {
            self.emit_event(EventPayload::BorrowableAmountUpdated(
                BorrowableAmountUpdatedEvent {
                    borrowable_amount: terms.borrowable_amount,
                },
            ));
        }
        Ok(())
    }

    // 7.3: manager-only top-up or draw-down of the undrawn principal.
    pub fn update_borrowable_amount(
        &mut self,
        caller: AccountId,
        delta: SignedAmount,
    ) -> Result<(), EngineError> {
        self.require_manager(caller)?;
        let asset = self.require_loan_asset()?;
        if self.position.is_closed() {
            return Err(EngineError::LoanClosed);
        }
        if delta.is_zero() {
            return Ok(());
        }

        let current = self.position.borrowable_amount();
        let snapshot = self.position.clone();

        if delta.is_positive() {
            let next = current.add(delta.abs());
            self.position.set_borrowable_amount(next);
            if let Err(e) = self
                .gateway
                .transfer(asset, self.vault, self.custody, delta.abs())
            {
                self.position = snapshot;
                return Err(e.into());
            }
        } else {
            // a decrease can never drive the borrowable amount negative; the
            // shortfall is the insufficient balance it would be at the gateway
            let next = current
                .checked_sub(delta.abs())
                .ok_or(LedgerError::InsufficientBalance {
                    asset,
                    holder: self.custody,
                    requested: delta.abs(),
                    available: current,
                })?;
            self.position.set_borrowable_amount(next);
            if let Err(e) = self
                .gateway
                .transfer(asset, self.custody, self.vault, delta.abs())
            {
                self.position = snapshot;
                return Err(e.into());
            }
        }

        self.emit_event(EventPayload::BorrowableAmountUpdated(
            BorrowableAmountUpdatedEvent {
                borrowable_amount: self.position.borrowable_amount(),
            },
        ));
        Ok(())
    }

    // 7.4: borrower draw. principal moves custody -> borrower directly.
    pub fn borrow(&mut self, caller: AccountId, amount: Amount) -> Result<(), EngineError> {
        let asset = self.require_loan_asset()?;
        self.require_borrower(caller)?;
        if amount.is_zero() {
            return Err(EngineError::EmptyAmount);
        }

        let available = self.position.borrowable_amount();
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                asset,
                holder: self.custody,
                requested: amount,
                available,
            })?;

        let snapshot = self.position.clone();
        self.position.set_borrowable_amount(remaining);
        self.position.add_borrowed(amount);

        if let Err(e) = self
            .gateway
            .transfer(asset, self.custody, caller, amount)
        {
            self.position = snapshot;
            return Err(e.into());
        }

        self.emit_event(EventPayload::TotalBorrowedUpdated(TotalBorrowedUpdatedEvent {
            total_borrowed: self.position.total_borrowed(),
        }));
        Ok(())
    }

    // 7.5: borrower repayment, borrower -> vault directly (custody is bypassed).
    // callable at any time, including after closure. RepayAmount::Max resolves to
    // the outstanding balance as of this call.
    pub fn repay(&mut self, caller: AccountId, amount: RepayAmount) -> Result<(), EngineError> {
        let asset = self.require_loan_asset()?;
        self.require_borrower(caller)?;

        let resolved = match amount {
            RepayAmount::Exact(a) => a,
            RepayAmount::Max => self.position.outstanding(),
        };
        if resolved.is_zero() {
            return Err(EngineError::NothingToRepay);
        }

        let snapshot = self.position.clone();
        self.position.add_repaid(resolved);

        if let Err(e) = self.gateway.transfer(asset, caller, self.vault, resolved) {
            self.position = snapshot;
            return Err(e.into());
        }

        self.emit_event(EventPayload::TotalRepaidUpdated(TotalRepaidUpdatedEvent {
            total_repaid: self.position.total_repaid(),
        }));
        Ok(())
    }

    // 7.6: one-shot closure. settles the custody loan-asset balance (incidental
    // balance counts as repayment), wraps and forwards native currency, sweeps the
    // listed extras, then retires the position. the unrecovered difference between
    // borrowed and repaid is a realized write-off, not an accounting error.
    pub fn close_loan(
        &mut self,
        caller: AccountId,
        extra_assets: &[AssetId],
    ) -> Result<(), EngineError> {
        self.require_manager(caller)?;
        let asset = self.require_loan_asset()?;
        if self.position.is_closed() {
            return Err(EngineError::LoanClosed);
        }

        let borrowable = self.position.borrowable_amount();
        let custody_balance = self.gateway.balance_of(asset, self.custody);
        let incidental_repayment = custody_balance.saturating_sub(borrowable);

        let snapshot = self.position.clone();
        self.position.add_repaid(incidental_repayment);
        self.position.set_borrowable_amount(Amount::ZERO);
        self.position.mark_closed();

        if let Err(e) = self.settle_custody_on_close(asset, custody_balance, extra_assets) {
            self.position = snapshot;
            return Err(e);
        }

        if let Some(m) = self.module.as_mut() {
            m.on_close(self.current_time);
        }

        if !incidental_repayment.is_zero() {
            self.emit_event(EventPayload::TotalRepaidUpdated(TotalRepaidUpdatedEvent {
                total_repaid: self.position.total_repaid(),
            }));
        }
        if !borrowable.is_zero() {
            self.emit_event(EventPayload::BorrowableAmountUpdated(
                BorrowableAmountUpdatedEvent {
                    borrowable_amount: Amount::ZERO,
                },
            ));
        }
        self.emit_event(EventPayload::LoanClosed(LoanClosedEvent));
        Ok(())
    }

    // all close-path transfers move full held balances, so a conforming gateway
    // settles each one; a failure still aborts the whole call.
    fn settle_custody_on_close(
        &mut self,
        loan_asset: AssetId,
        custody_balance: Amount,
        extra_assets: &[AssetId],
    ) -> Result<(), EngineError> {
        if !custody_balance.is_zero() {
            self.gateway
                .transfer(loan_asset, self.custody, self.vault, custody_balance)?;
        }

        let native_balance = self
            .gateway
            .balance_of(self.gateway.native_asset(), self.custody);
        if !native_balance.is_zero() {
            let wrapped = self.gateway.wrap_native(self.custody, native_balance)?;
            self.gateway
                .transfer(wrapped, self.custody, self.vault, native_balance)?;
        }

        for &extra in extra_assets {
            if extra == loan_asset {
                continue;
            }
            let balance = self.gateway.balance_of(extra, self.custody);
            if !balance.is_zero() {
                self.gateway
                    .transfer(extra, self.custody, self.vault, balance)?;
            }
        }
        Ok(())
    }

    // 7.7: incidental-balance recovery. forwards the full held balance of each
    // listed asset to the vault without altering loan accounting. callable in any
    // state, any number of times. the loan asset itself is never swept here.
    pub fn reconcile(
        &mut self,
        caller: AccountId,
        extra_assets: &[AssetId],
    ) -> Result<(), EngineError> {
        self.require_manager(caller)?;

        for &extra in extra_assets {
            if Some(extra) == self.position.loan_asset() {
                continue;
            }
            let balance = self.gateway.balance_of(extra, self.custody);
            if !balance.is_zero() {
                self.gateway
                    .transfer(extra, self.custody, self.vault, balance)?;
            }
        }

        if let Some(m) = self.module.as_mut() {
            m.on_reconcile(self.current_time);
        }
        Ok(())
    }

    // 7.8: valuation, read-only. closed or zero face value reports an empty
    // result; a zero-amount entry is never present.
    pub fn get_managed_assets(&self) -> (Vec<AssetId>, Vec<Amount>) {
        match self.position.managed_assets() {
            Some((asset, amount)) => (vec![asset], vec![amount]),
            None => (Vec::new(), Vec::new()),
        }
    }

    // accessors

    pub fn position(&self) -> &LoanPosition {
        &self.position
    }

    pub fn borrower(&self) -> Option<AccountId> {
        self.position.borrower()
    }

    pub fn loan_asset(&self) -> Option<AssetId> {
        self.position.loan_asset()
    }

    pub fn borrowable_amount(&self) -> Amount {
        self.position.borrowable_amount()
    }

    pub fn total_borrowed(&self) -> Amount {
        self.position.total_borrowed()
    }

    pub fn total_repaid(&self) -> Amount {
        self.position.total_repaid()
    }

    pub fn is_configured(&self) -> bool {
        self.position.is_configured()
    }

    pub fn is_closed(&self) -> bool {
        self.position.is_closed()
    }

    pub fn has_accounting_module(&self) -> bool {
        self.module.is_some()
    }

    pub fn custody_account(&self) -> AccountId {
        self.custody
    }

    pub fn vault_account(&self) -> AccountId {
        self.vault
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    // internals

    fn require_manager(&self, caller: AccountId) -> Result<(), EngineError> {
        if self.gate.is_manager(caller) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized(caller))
        }
    }

    fn require_borrower(&self, caller: AccountId) -> Result<(), EngineError> {
        match self.position.borrower() {
            Some(borrower) if borrower == caller => Ok(()),
            Some(_) => Err(EngineError::Unauthorized(caller)),
            None => Err(EngineError::NotConfigured),
        }
    }

    fn require_loan_asset(&self) -> Result<AssetId, EngineError> {
        self.position.loan_asset().ok_or(EngineError::NotConfigured)
    }

    fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
