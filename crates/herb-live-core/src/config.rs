use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;
pub const DEFAULT_ANALYSIS_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_NODE_BINARY: &str = "node";
pub const EVENT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    pub node_binary: String,
    pub analyzer_script: Option<PathBuf>,
    /// Directory the analyzer search starts from.
    pub search_root: PathBuf,
    pub debounce: Duration,
    pub analysis_timeout: Duration,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            node_binary: DEFAULT_NODE_BINARY.to_string(),
            analyzer_script: None,
            search_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            analysis_timeout: Duration::from_millis(DEFAULT_ANALYSIS_TIMEOUT_MS),
        }
    }
}
