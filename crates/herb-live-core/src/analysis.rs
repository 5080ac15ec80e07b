use crate::error::{AnalysisError, AnalysisErrorKind};
use crate::tabs::{Tab, TabOutputs};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const LOADING_TEXT: &str = "Loading...";

/// Immutable snapshot of the buffer taken when an analysis is scheduled.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub generation: u64,
    pub content: Arc<str>,
    pub issued_at: Instant,
}

impl AnalysisRequest {
    pub fn new(generation: u64, content: impl Into<Arc<str>>) -> Self {
        Self {
            generation,
            content: content.into(),
            issued_at: Instant::now(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Messages background tasks deliver to the event loop.
#[derive(Debug)]
pub enum AnalysisEvent {
    DebounceFired(AnalysisRequest),
    Completed(AnalysisResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Ready,
    Empty,
    Failed(AnalysisErrorKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerMeta {
    pub version: String,
    pub duration_ms: f64,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub generation: u64,
    pub content: Arc<str>,
    pub outputs: TabOutputs,
    pub status: AnalysisStatus,
    pub meta: Option<AnalyzerMeta>,
    pub elapsed: Duration,
}

impl AnalysisResult {
    pub fn placeholder(request: &AnalysisRequest) -> Self {
        Self {
            generation: request.generation,
            content: request.content.clone(),
            outputs: TabOutputs::placeholders(),
            status: AnalysisStatus::Empty,
            meta: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn from_payload(request: &AnalysisRequest, payload: AnalyzerPayload) -> Self {
        let meta = payload.meta();
        Self {
            generation: request.generation,
            content: request.content.clone(),
            outputs: payload.into_outputs(),
            status: AnalysisStatus::Ready,
            meta,
            elapsed: request.issued_at.elapsed(),
        }
    }

    pub fn failed(request: &AnalysisRequest, error: &AnalysisError) -> Self {
        Self {
            generation: request.generation,
            content: request.content.clone(),
            outputs: TabOutputs::uniform(error.user_message()),
            status: AnalysisStatus::Failed(error.kind()),
            meta: None,
            elapsed: request.issued_at.elapsed(),
        }
    }

    pub fn success(&self) -> bool {
        !matches!(self.status, AnalysisStatus::Failed(_))
    }
}

/// JSON record printed by the external analyzer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerPayload {
    pub parse: String,
    pub lex: String,
    pub ruby: String,
    pub html: String,
    pub linter: String,
    pub version: String,
    pub duration: f64,
    pub success: bool,
    pub error: Option<String>,
}

impl AnalyzerPayload {
    pub fn meta(&self) -> Option<AnalyzerMeta> {
        if self.version.trim().is_empty() {
            return None;
        }
        Some(AnalyzerMeta {
            version: self.version.trim().to_string(),
            duration_ms: self.duration,
        })
    }

    pub fn into_outputs(self) -> TabOutputs {
        let mut outputs = TabOutputs::default();
        outputs.set(Tab::Linter, self.linter);
        outputs.set(Tab::Parse, format_tree(&self.parse));
        outputs.set(Tab::Lex, format_tokens(&self.lex));
        outputs.set(Tab::Ruby, format_ruby(&self.ruby));
        outputs.set(Tab::Html, format_html(&self.html));
        outputs
    }
}

fn with_heading(heading: &str, underline_width: usize, body: &str) -> String {
    format!("{heading}\n{}\n\n{body}", "=".repeat(underline_width))
}

pub fn format_tree(parse: &str) -> String {
    if parse.is_empty() || parse == "Parse failed" {
        return "❌ Parse failed".to_string();
    }
    with_heading("🌳 Parse Result", 15, parse)
}

pub fn format_tokens(lex: &str) -> String {
    if lex.is_empty() || lex == "Lex failed" {
        return "❌ Lex failed".to_string();
    }
    with_heading("📝 Lex Result", 13, lex)
}

pub const NO_RUBY_TEXT: &str =
    "💎 No Ruby Code Found\n=====================\n\nThis ERB template contains no Ruby expressions.";

pub const NO_HTML_TEXT: &str =
    "🏷️  No HTML Found\n=================\n\nThis ERB template contains no HTML content.";

pub fn format_ruby(ruby: &str) -> String {
    if ruby.trim().is_empty() || ruby == "No Ruby code found" {
        return NO_RUBY_TEXT.to_string();
    }
    with_heading("💎 Extracted Ruby Code", 22, ruby)
}

pub fn format_html(html: &str) -> String {
    if html.trim().is_empty() || html == "No HTML found" {
        return NO_HTML_TEXT.to_string();
    }
    with_heading("🏷️  Extracted HTML", 18, html)
}
