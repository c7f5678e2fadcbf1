// arbloan-core: delegated loan position accounting engine.
// custody-safe architecture: the state machine and valuation clamp take priority.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: AccountId, AssetId, Amount, SignedAmount, Description
//   2.x  ledger.rs: transfer gateway seam + in-memory mock ledger
//   3.x  auth.rs: authorization gate seam
//   4.x  accounting.rs: optional pluggable accounting module
//   5.x  events.rs: state transition events for audit
//   6.x  position.rs: loan position state + face-value valuation
//   7.x  engine.rs: the loan engine: configure, adjust, borrow, repay, close, reconcile
//   8.x  config.rs: engine tunables (event log bound, verbosity)

// core loan modules
pub mod engine;
pub mod events;
pub mod position;
pub mod types;

// collaborator seams
pub mod accounting;
pub mod auth;
pub mod config;
pub mod ledger;

// re exports for convenience
pub use accounting::*;
pub use auth::*;
pub use config::*;
pub use engine::*;
pub use events::*;
pub use ledger::*;
pub use position::*;
pub use types::*;
