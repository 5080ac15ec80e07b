//! Live analysis plumbing for the herb-live terminal playground: the tab
//! registry, the output viewport, the analyzer gateway and the debounce
//! scheduler. Nothing in here touches the terminal.

pub mod analysis;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gateway;
pub mod process;
pub mod tabs;
pub mod viewport;

pub use analysis::{
    AnalysisEvent, AnalysisRequest, AnalysisResult, AnalysisStatus, AnalyzerMeta, AnalyzerPayload,
    LOADING_TEXT,
};
pub use config::PlaygroundConfig;
pub use debounce::Debouncer;
pub use error::{AnalysisError, AnalysisErrorKind, MissingTool};
pub use gateway::{run_analysis, AnalysisDispatcher, Analyzer, ScriptedAnalyzer};
pub use process::{discover_analyzer, ProcessAnalyzer, ANALYZER_SCRIPT};
pub use tabs::{Tab, TabOutputs, TabState};
pub use viewport::{line_count, visible_window, ScrollState, PAGE_STRIDE};
