mod app;
mod editor;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use herb_live_core::config::{
    DEFAULT_ANALYSIS_TIMEOUT_MS, DEFAULT_DEBOUNCE_MS, DEFAULT_NODE_BINARY, EVENT_QUEUE_CAPACITY,
};
use herb_live_core::{AnalysisEvent, PlaygroundConfig, ProcessAnalyzer};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_TEMPLATE: &str = r#"<div class="container">
  <h1>Hello, <%= @name %>!</h1>
  <% if @items.any? %>
    <ul>
      <% @items.each do |item| %>
        <li><%= item %></li>
      <% end %>
    </ul>
  <% else %>
    <p>No items found.</p>
  <% end %>
</div>"#;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Live ERB template playground: edit on the left, analysis on the right.
#[derive(Parser, Debug)]
#[command(name = "herb-live", version)]
struct Cli {
    /// Template to open. `-` reads stdin; omitted opens a sample template.
    file: Option<PathBuf>,
    /// Path to herb-analyzer.js; searched for near the working directory when unset.
    #[arg(long, env = "HERB_LIVE_ANALYZER")]
    analyzer: Option<PathBuf>,
    /// Node.js binary used to run the analyzer.
    #[arg(long, env = "HERB_LIVE_NODE", default_value = DEFAULT_NODE_BINARY)]
    node: String,
    /// Quiet period after the last edit before analysis runs.
    #[arg(long, env = "HERB_LIVE_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,
    /// Upper bound on a single analyzer run.
    #[arg(long, env = "HERB_LIVE_TIMEOUT_MS", default_value_t = DEFAULT_ANALYSIS_TIMEOUT_MS)]
    timeout_ms: u64,
    /// Write logs here; logging is discarded otherwise.
    #[arg(long, env = "HERB_LIVE_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> PlaygroundConfig {
        PlaygroundConfig {
            node_binary: self.node.clone(),
            analyzer_script: self.analyzer.clone(),
            debounce: Duration::from_millis(self.debounce_ms),
            analysis_timeout: Duration::from_millis(self.timeout_ms),
            ..PlaygroundConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let initial = load_initial(cli.file.as_deref()).await?;
    let config = cli.config();
    info!(
        node = %config.node_binary,
        debounce_ms = config.debounce.as_millis() as u64,
        timeout_ms = config.analysis_timeout.as_millis() as u64,
        "starting herb-live"
    );

    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let analyzer = Arc::new(ProcessAnalyzer::from_config(&config));
    let mut app = App::new(&initial, &config, analyzer, tx);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, &mut rx).await;
    restore_terminal(&mut terminal)?;

    if let Err(err) = result {
        eprintln!("herb-live: {err:#}");
    }
    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

async fn load_initial(file: Option<&Path>) -> Result<String> {
    let Some(path) = file else {
        return Ok(SAMPLE_TEMPLATE.to_string());
    };
    if path == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("read template from stdin")?;
        return Ok(content);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read template {}", path.display()))
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    rx: &mut mpsc::Receiver<AnalysisEvent>,
) -> Result<()> {
    let mut events = EventStream::new();
    let size = terminal.size()?;
    app.handle_event(Event::Resize(size.width, size.height));
    app.start();

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            Some(event) = rx.recv() => {
                app.handle_analysis_event(event);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(event)) => app.handle_event(event),
                    Some(Err(err)) => return Err(err).context("read terminal event"),
                    None => break,
                }
            }
        }

        if app.should_quit() {
            info!("quit requested");
            break;
        }
    }

    Ok(())
}
