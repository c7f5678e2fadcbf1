// 8.0 config.rs: engine tunables. nothing here changes loan semantics; these only
// bound the in-memory audit log and control sim output.

#[derive(Debug, Clone)]
pub struct EngineConfig {
    // events retained before the oldest are dropped
    pub max_events: usize,
    // print each event as it is emitted
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            verbose: false,
        }
    }
}
