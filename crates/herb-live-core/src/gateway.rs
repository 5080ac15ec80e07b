use crate::analysis::{AnalysisEvent, AnalysisRequest, AnalysisResult, AnalyzerPayload};
use crate::error::AnalysisError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// External analysis capability. One call per snapshot, no session state.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, content: &str) -> Result<AnalyzerPayload, AnalysisError>;
}

/// Runs one analysis cycle and shapes the outcome into per-tab text.
/// Failures are folded into the result; this never returns an error.
pub async fn run_analysis(
    analyzer: &dyn Analyzer,
    request: &AnalysisRequest,
    deadline: Duration,
) -> AnalysisResult {
    if request.is_blank() {
        return AnalysisResult::placeholder(request);
    }

    let outcome = match tokio::time::timeout(deadline, analyzer.analyze(&request.content)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AnalysisError::TimedOut(deadline)),
    };

    match outcome {
        Ok(payload) => AnalysisResult::from_payload(request, payload),
        Err(err) => {
            warn!(
                generation = request.generation,
                kind = err.kind().label(),
                "analysis failed: {err}"
            );
            AnalysisResult::failed(request, &err)
        }
    }
}

/// Spawns analyses off the event loop and reports completions through `tx`.
#[derive(Clone)]
pub struct AnalysisDispatcher {
    analyzer: Arc<dyn Analyzer>,
    tx: mpsc::Sender<AnalysisEvent>,
    deadline: Duration,
}

impl AnalysisDispatcher {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        tx: mpsc::Sender<AnalysisEvent>,
        deadline: Duration,
    ) -> Self {
        Self {
            analyzer,
            tx,
            deadline,
        }
    }

    pub fn dispatch(&self, request: AnalysisRequest) {
        info!(
            generation = request.generation,
            bytes = request.content.len(),
            "dispatching analysis"
        );
        let analyzer = self.analyzer.clone();
        let tx = self.tx.clone();
        let deadline = self.deadline;
        tokio::spawn(async move {
            let result = run_analysis(analyzer.as_ref(), &request, deadline).await;
            debug!(
                generation = result.generation,
                elapsed_ms = result.elapsed.as_millis() as u64,
                "analysis finished"
            );
            if tx.send(AnalysisEvent::Completed(result)).await.is_err() {
                debug!("event loop gone; dropping analysis result");
            }
        });
    }
}

type Responder = dyn Fn(&str) -> Result<AnalyzerPayload, AnalysisError> + Send + Sync;

/// Deterministic in-memory analyzer. Records every call and can hold back
/// specific contents to simulate slow runs.
pub struct ScriptedAnalyzer {
    calls: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
    responder: Box<Responder>,
}

impl ScriptedAnalyzer {
    /// Echoes the content back through every view.
    pub fn echo() -> Self {
        Self::with_responder(|content| {
            Ok(AnalyzerPayload {
                parse: format!("tree({content})"),
                lex: format!("tokens({content})"),
                ruby: String::new(),
                html: format!("markup({content})"),
                linter: format!("lint({content})"),
                version: "scripted".to_string(),
                duration: 0.0,
                success: true,
                error: None,
            })
        })
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<AnalyzerPayload, AnalysisError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            delays: HashMap::new(),
            responder: Box::new(responder),
        }
    }

    pub fn delay(mut self, content: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(content.into(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Analyzer for ScriptedAnalyzer {
    async fn analyze(&self, content: &str) -> Result<AnalyzerPayload, AnalysisError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(content.to_string());
        }
        if let Some(delay) = self.delays.get(content) {
            tokio::time::sleep(*delay).await;
        }
        (self.responder)(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisStatus;
    use crate::error::{AnalysisErrorKind, MissingTool};
    use crate::tabs::{Tab, TabOutputs};

    #[tokio::test]
    async fn blank_content_never_reaches_the_analyzer() {
        let analyzer = ScriptedAnalyzer::echo();
        let request = AnalysisRequest::new(1, "  \n\t ");
        let result = run_analysis(&analyzer, &request, Duration::from_secs(1)).await;
        assert_eq!(result.status, AnalysisStatus::Empty);
        assert_eq!(result.outputs, TabOutputs::placeholders());
        assert!(analyzer.calls().is_empty());
    }

    #[tokio::test]
    async fn payload_is_routed_per_tab() {
        let analyzer = ScriptedAnalyzer::echo();
        let request = AnalysisRequest::new(7, "abc");
        let result = run_analysis(&analyzer, &request, Duration::from_secs(1)).await;
        assert_eq!(result.status, AnalysisStatus::Ready);
        assert_eq!(result.generation, 7);
        assert_eq!(result.outputs.get(Tab::Linter), "lint(abc)");
        assert!(result.outputs.get(Tab::Parse).ends_with("tree(abc)"));
        assert_eq!(result.meta.map(|meta| meta.version).as_deref(), Some("scripted"));
        assert_eq!(analyzer.calls(), vec!["abc".to_string()]);
    }

    #[tokio::test]
    async fn unavailable_tool_fills_every_tab_with_the_same_message() {
        let analyzer = ScriptedAnalyzer::with_responder(|_| {
            Err(AnalysisError::ToolUnavailable {
                tool: MissingTool::AnalyzerScript,
                searched: Vec::new(),
            })
        });
        let request = AnalysisRequest::new(1, "<div>");
        let result = run_analysis(&analyzer, &request, Duration::from_secs(1)).await;
        assert_eq!(
            result.status,
            AnalysisStatus::Failed(AnalysisErrorKind::ToolUnavailable)
        );
        let expected = AnalysisError::ToolUnavailable {
            tool: MissingTool::AnalyzerScript,
            searched: Vec::new(),
        }
        .user_message();
        for (_, text) in result.outputs.iter() {
            assert_eq!(text, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_analyzer_resolves_to_process_failure_at_deadline() {
        let analyzer = ScriptedAnalyzer::echo().delay("slow", Duration::from_secs(60));
        let request = AnalysisRequest::new(1, "slow");
        let result = run_analysis(&analyzer, &request, Duration::from_millis(500)).await;
        assert_eq!(
            result.status,
            AnalysisStatus::Failed(AnalysisErrorKind::ProcessFailure)
        );
        assert!(result
            .outputs
            .get(Tab::Html)
            .contains("did not finish within 500 ms"));
    }

    #[tokio::test]
    async fn dispatcher_reports_completion_on_the_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let dispatcher =
            AnalysisDispatcher::new(Arc::new(ScriptedAnalyzer::echo()), tx, Duration::from_secs(1));
        dispatcher.dispatch(AnalysisRequest::new(2, "x"));
        match rx.recv().await {
            Some(AnalysisEvent::Completed(result)) => {
                assert_eq!(result.generation, 2);
                assert_eq!(&*result.content, "x");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
