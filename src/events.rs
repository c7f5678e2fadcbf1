// 5.0: every committed state change produces an event. used for audit trails and
// off-chain observers. the EventPayload enum lists all event types.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount, AssetId, Description, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    LoanConfigured(LoanConfiguredEvent),
    BorrowableAmountUpdated(BorrowableAmountUpdatedEvent),
    TotalBorrowedUpdated(TotalBorrowedUpdatedEvent),
    TotalRepaidUpdated(TotalRepaidUpdatedEvent),
    LoanClosed(LoanClosedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanConfiguredEvent {
    pub borrower: AccountId,
    pub loan_asset: AssetId,
    pub has_accounting_module: bool,
    pub description: Description,
}

// carries the new running total, not the delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowableAmountUpdatedEvent {
    pub borrowable_amount: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalBorrowedUpdatedEvent {
    pub total_borrowed: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalRepaidUpdatedEvent {
    pub total_repaid: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanClosedEvent;
