use crate::analysis::AnalyzerPayload;
use crate::config::PlaygroundConfig;
use crate::error::{AnalysisError, MissingTool};
use crate::gateway::Analyzer;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use tokio::process::Command;
use tracing::debug;

pub const ANALYZER_SCRIPT: &str = "herb-analyzer.js";

const SEARCH_CANDIDATES: [&str; 3] = [
    ANALYZER_SCRIPT,
    "playground-cli/herb-analyzer.js",
    "../playground-cli/herb-analyzer.js",
];
const PREVIEW_CHARS: usize = 100;
const DETAIL_CHARS: usize = 2000;

/// Paths probed for the analyzer script, in priority order.
pub fn analyzer_candidates(search_root: &Path, explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(SEARCH_CANDIDATES.len() + 1);
    if let Some(path) = explicit {
        candidates.push(if path.is_absolute() {
            path.to_path_buf()
        } else {
            search_root.join(path)
        });
    }
    candidates.extend(SEARCH_CANDIDATES.iter().map(|rel| search_root.join(rel)));
    candidates
}

pub fn discover_analyzer(
    search_root: &Path,
    explicit: Option<&Path>,
) -> Result<PathBuf, AnalysisError> {
    let candidates = analyzer_candidates(search_root, explicit);
    match candidates.iter().find(|path| path.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(AnalysisError::ToolUnavailable {
            tool: MissingTool::AnalyzerScript,
            searched: candidates,
        }),
    }
}

/// Runs `node herb-analyzer.js <tmpfile>` once per call.
#[derive(Debug, Clone)]
pub struct ProcessAnalyzer {
    node: String,
    script: Option<PathBuf>,
    search_root: PathBuf,
}

impl ProcessAnalyzer {
    pub fn new(
        node: impl Into<String>,
        script: Option<PathBuf>,
        search_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            node: node.into(),
            script,
            search_root: search_root.into(),
        }
    }

    pub fn from_config(config: &PlaygroundConfig) -> Self {
        Self::new(
            config.node_binary.clone(),
            config.analyzer_script.clone(),
            config.search_root.clone(),
        )
    }

    fn spawn_error(&self, err: io::Error) -> AnalysisError {
        if err.kind() == io::ErrorKind::NotFound {
            AnalysisError::ToolUnavailable {
                tool: MissingTool::Interpreter(self.node.clone()),
                searched: vec![PathBuf::from(&self.node)],
            }
        } else {
            AnalysisError::Io(err)
        }
    }
}

#[async_trait]
impl Analyzer for ProcessAnalyzer {
    async fn analyze(&self, content: &str) -> Result<AnalyzerPayload, AnalysisError> {
        let script = discover_analyzer(&self.search_root, self.script.as_deref())?;

        // Removed on drop, including when the caller's deadline cancels us.
        let input = tempfile::Builder::new()
            .prefix("erb-")
            .suffix(".html.erb")
            .tempfile()?;
        tokio::fs::write(input.path(), content).await?;

        debug!(
            script = %script.display(),
            input = %input.path().display(),
            "running analyzer"
        );
        let output = Command::new(&self.node)
            .arg(&script)
            .arg(input.path())
            .current_dir(&self.search_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| self.spawn_error(err))?;

        if let Err(err) = input.close() {
            debug!("failed to remove analyzer input: {err}");
        }

        decode_output(&output)
    }
}

fn decode_output(output: &Output) -> Result<AnalyzerPayload, AnalysisError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AnalysisError::ProcessFailure {
            detail: failure_detail(output.status, &stdout, &stderr),
        });
    }

    serde_json::from_str::<AnalyzerPayload>(stdout.trim()).map_err(|err| {
        AnalysisError::MalformedOutput {
            reason: err.to_string(),
            preview: preview(&stdout),
        }
    })
}

fn failure_detail(status: ExitStatus, stdout: &str, stderr: &str) -> String {
    let reported = serde_json::from_str::<AnalyzerPayload>(stdout.trim())
        .ok()
        .and_then(|payload| payload.error)
        .filter(|error| !error.trim().is_empty());
    let detail = reported
        .or_else(|| {
            let stderr = stderr.trim();
            (!stderr.is_empty()).then(|| stderr.to_string())
        })
        .unwrap_or_else(|| status.to_string());
    truncate_chars(detail, DETAIL_CHARS)
}

fn preview(stdout: &str) -> String {
    if stdout.chars().count() <= PREVIEW_CHARS {
        return stdout.to_string();
    }
    let mut out = stdout.chars().take(PREVIEW_CHARS).collect::<String>();
    out.push_str("...");
    out
}

fn truncate_chars(text: String, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text;
    }
    let mut out = text.chars().take(limit.saturating_sub(3)).collect::<String>();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisRequest, AnalysisStatus};
    use crate::error::AnalysisErrorKind;
    use crate::gateway::run_analysis;
    use std::fs;
    use std::time::Duration;

    fn fixture_root() -> tempfile::TempDir {
        tempfile::Builder::new()
            .prefix("herb-live-process")
            .tempdir()
            .expect("tempdir")
    }

    #[test]
    fn explicit_script_takes_priority() {
        let root = fixture_root();
        fs::write(root.path().join(ANALYZER_SCRIPT), "").expect("default script");
        fs::write(root.path().join("custom.js"), "").expect("custom script");

        let found = discover_analyzer(root.path(), Some(Path::new("custom.js"))).expect("found");
        assert_eq!(found, root.path().join("custom.js"));
    }

    #[test]
    fn sibling_playground_directory_is_searched() {
        let root = fixture_root();
        let work = root.path().join("work");
        fs::create_dir_all(&work).expect("work dir");
        fs::create_dir_all(root.path().join("playground-cli")).expect("sibling");
        fs::write(root.path().join("playground-cli").join(ANALYZER_SCRIPT), "").expect("script");

        let found = discover_analyzer(&work, None).expect("found");
        assert!(found.ends_with("playground-cli/herb-analyzer.js"));
    }

    #[test]
    fn missing_script_reports_every_searched_path() {
        let root = fixture_root();
        let err = discover_analyzer(root.path(), Some(Path::new("nope.js"))).unwrap_err();
        match err {
            AnalysisError::ToolUnavailable { tool, searched } => {
                assert_eq!(tool, MissingTool::AnalyzerScript);
                assert_eq!(searched.len(), SEARCH_CANDIDATES.len() + 1);
                assert_eq!(searched[0], root.path().join("nope.js"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_output_preview_is_cut_at_one_hundred_chars() {
        let text = "x".repeat(150);
        let cut = preview(&text);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[cfg(unix)]
    mod shell {
        use super::*;

        // `sh` plays the role of node so the script below stands in for the analyzer.
        fn analyzer_with_script(body: &str) -> (tempfile::TempDir, ProcessAnalyzer) {
            let root = fixture_root();
            fs::write(root.path().join(ANALYZER_SCRIPT), body).expect("script");
            let analyzer = ProcessAnalyzer::new("sh", None, root.path());
            (root, analyzer)
        }

        #[tokio::test]
        async fn successful_run_decodes_payload_and_removes_input() {
            let (_root, analyzer) = analyzer_with_script(
                "printf '{\"parse\":\"%s\",\"lex\":\"%s\",\"success\":true,\"version\":\"1.0\"}' \"$1\" \"$(cat \"$1\")\"\n",
            );
            let payload = analyzer.analyze("<p>hi</p>").await.expect("payload");
            assert_eq!(payload.lex, "<p>hi</p>");
            assert!(payload.parse.ends_with(".html.erb"));
            assert!(!Path::new(&payload.parse).exists());
            assert_eq!(payload.version, "1.0");
        }

        #[tokio::test]
        async fn non_zero_exit_surfaces_stderr() {
            let (_root, analyzer) = analyzer_with_script("echo 'boom: bad template' >&2\nexit 3\n");
            let err = analyzer.analyze("<p>").await.unwrap_err();
            assert_eq!(err.kind(), AnalysisErrorKind::ProcessFailure);
            assert_eq!(err.user_message(), "❌ Analysis failed: boom: bad template");
        }

        #[tokio::test]
        async fn non_zero_exit_prefers_reported_error() {
            let (_root, analyzer) = analyzer_with_script(
                "echo '{\"error\":\"wasm failed to load\",\"success\":false}'\necho noise >&2\nexit 1\n",
            );
            let err = analyzer.analyze("<p>").await.unwrap_err();
            match err {
                AnalysisError::ProcessFailure { detail } => assert_eq!(detail, "wasm failed to load"),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn garbage_output_is_malformed() {
            let (_root, analyzer) = analyzer_with_script("echo 'not json at all'\n");
            let err = analyzer.analyze("<p>").await.unwrap_err();
            assert_eq!(err.kind(), AnalysisErrorKind::MalformedOutput);
            assert!(err.user_message().contains("First 100 chars: not json at all"));
        }

        #[tokio::test]
        async fn missing_interpreter_is_tool_unavailable() {
            let root = fixture_root();
            fs::write(root.path().join(ANALYZER_SCRIPT), "").expect("script");
            let analyzer =
                ProcessAnalyzer::new("herb-live-no-such-interpreter", None, root.path());
            let err = analyzer.analyze("<p>").await.unwrap_err();
            assert_eq!(err.kind(), AnalysisErrorKind::ToolUnavailable);
            let message = err.user_message();
            assert!(message.contains("`herb-live-no-such-interpreter` not found"));
            assert!(message.contains("HERB_LIVE_NODE"));
            assert!(!message.contains("herb-analyzer.js not found"));
        }

        // The script records the input path it was handed next to itself.
        const RECORD_INPUT: &str = "printf '%s' \"$1\" > \"$(dirname \"$0\")/input-path\"\n";

        fn recorded_input(root: &tempfile::TempDir) -> PathBuf {
            let recorded = fs::read_to_string(root.path().join("input-path")).expect("recorded path");
            PathBuf::from(recorded)
        }

        #[tokio::test]
        async fn input_file_is_removed_after_non_zero_exit() {
            let (root, analyzer) =
                analyzer_with_script(&format!("{RECORD_INPUT}echo 'broken' >&2\nexit 2\n"));
            let err = analyzer.analyze("<p>").await.unwrap_err();
            assert_eq!(err.kind(), AnalysisErrorKind::ProcessFailure);

            let input = recorded_input(&root);
            assert!(input.to_string_lossy().ends_with(".html.erb"));
            assert!(!input.exists());
        }

        #[tokio::test]
        async fn input_file_is_removed_when_the_deadline_cancels_the_run() {
            let (root, analyzer) = analyzer_with_script(&format!("{RECORD_INPUT}sleep 30\n"));
            let request = AnalysisRequest::new(1, "<p>");
            let result = run_analysis(&analyzer, &request, Duration::from_millis(1500)).await;
            assert_eq!(
                result.status,
                AnalysisStatus::Failed(AnalysisErrorKind::ProcessFailure)
            );

            let input = recorded_input(&root);
            assert!(!input.exists());
        }
    }
}
