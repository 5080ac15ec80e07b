use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Which half of the analyzer invocation could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingTool {
    AnalyzerScript,
    Interpreter(String),
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingTool::AnalyzerScript => f.write_str("herb-analyzer.js"),
            MissingTool::Interpreter(binary) => write!(f, "interpreter `{binary}`"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    ToolUnavailable,
    ProcessFailure,
    MalformedOutput,
    IoFailure,
}

impl AnalysisErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisErrorKind::ToolUnavailable => "analyzer unavailable",
            AnalysisErrorKind::ProcessFailure => "analysis failed",
            AnalysisErrorKind::MalformedOutput => "malformed output",
            AnalysisErrorKind::IoFailure => "io failure",
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{tool} not found")]
    ToolUnavailable {
        tool: MissingTool,
        searched: Vec<PathBuf>,
    },
    #[error("analysis failed: {detail}")]
    ProcessFailure { detail: String },
    #[error("analyzer did not finish within {} ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("failed to parse analysis result: {reason}")]
    MalformedOutput { reason: String, preview: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::ToolUnavailable { .. } => AnalysisErrorKind::ToolUnavailable,
            AnalysisError::ProcessFailure { .. } | AnalysisError::TimedOut(_) => {
                AnalysisErrorKind::ProcessFailure
            }
            AnalysisError::MalformedOutput { .. } => AnalysisErrorKind::MalformedOutput,
            AnalysisError::Io(_) => AnalysisErrorKind::IoFailure,
        }
    }

    /// Text placed into every tab when a call fails.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ToolUnavailable {
                tool: MissingTool::AnalyzerScript,
                ..
            } => [
                "❌ herb-analyzer.js not found",
                "",
                "Run herb-live from the directory containing herb-analyzer.js,",
                "or point --analyzer / HERB_LIVE_ANALYZER at it.",
            ]
            .join("\n"),
            AnalysisError::ToolUnavailable {
                tool: MissingTool::Interpreter(binary),
                ..
            } => format!(
                "❌ Node.js interpreter `{binary}` not found\n\n\
                 Install Node.js, or point --node / HERB_LIVE_NODE at the interpreter."
            ),
            AnalysisError::ProcessFailure { detail } => format!("❌ Analysis failed: {detail}"),
            AnalysisError::TimedOut(deadline) => format!(
                "❌ Analysis failed: analyzer did not finish within {} ms",
                deadline.as_millis()
            ),
            AnalysisError::MalformedOutput { reason, preview } => format!(
                "❌ Failed to parse analysis result: {reason}\nFirst 100 chars: {preview}"
            ),
            AnalysisError::Io(err) => format!("❌ Failed to prepare analyzer input: {err}"),
        }
    }
}
