// 4.0 accounting.rs: optional pluggable accounting module. the engine consults it
// at defined hook points and otherwise treats it as opaque. module effects land on
// external balances, never on the engine's own counters, so loan invariants hold
// regardless of what an implementation does.

use std::sync::{Arc, Mutex};

use crate::types::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleError {
    #[error("Invalid module config data: {reason}")]
    InvalidConfigData { reason: String },
}

pub trait AccountingModule {
    // called once, during loan configuration, with the opaque config payload.
    fn on_configure(&mut self, config_data: &[u8]) -> Result<(), ModuleError>;

    // close/reconcile hooks. default to no-ops so simple modules only implement
    // what they care about.
    fn on_close(&mut self, _timestamp: Timestamp) {}

    fn on_reconcile(&mut self, _timestamp: Timestamp) {}
}

// test double: records every hook invocation into a log the test keeps a handle to
// after the module itself moves into the engine.
#[derive(Debug, Default)]
pub struct HookLog {
    pub configured_with: Option<Vec<u8>>,
    pub close_calls: u32,
    pub reconcile_calls: u32,
}

#[derive(Debug, Default)]
pub struct RecordingModule {
    log: Arc<Mutex<HookLog>>,
}

impl RecordingModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<HookLog>> {
        Arc::clone(&self.log)
    }
}

impl AccountingModule for RecordingModule {
    fn on_configure(&mut self, config_data: &[u8]) -> Result<(), ModuleError> {
        self.log.lock().unwrap().configured_with = Some(config_data.to_vec());
        Ok(())
    }

    fn on_close(&mut self, _timestamp: Timestamp) {
        self.log.lock().unwrap().close_calls += 1;
    }

    fn on_reconcile(&mut self, _timestamp: Timestamp) {
        self.log.lock().unwrap().reconcile_calls += 1;
    }
}
