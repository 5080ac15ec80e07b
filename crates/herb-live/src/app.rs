use crate::editor::Editor;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use herb_live_core::{
    line_count, AnalysisDispatcher, AnalysisEvent, AnalysisRequest, AnalysisResult,
    AnalysisStatus, Analyzer, AnalyzerMeta, Debouncer, PlaygroundConfig, ScrollState, Tab,
    TabOutputs, TabState, LOADING_TEXT,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Output,
}

/// Orchestrator state. Owned by the event loop; background work only talks
/// to it through [`AnalysisEvent`]s.
pub struct App {
    editor: Editor,
    /// Bumped on every edit; results from older generations are stale.
    generation: u64,
    applied_generation: Option<u64>,
    /// Last generation handed to the analyzer, so a queued fire cannot repeat it.
    dispatched_generation: Option<u64>,
    focus: Focus,
    tabs: TabState,
    outputs: TabOutputs,
    scroll: ScrollState,
    debouncer: Debouncer,
    dispatcher: AnalysisDispatcher,
    in_flight: usize,
    last_status: Option<AnalysisStatus>,
    last_meta: Option<AnalyzerMeta>,
    size: (u16, u16),
    output_height: usize,
    should_quit: bool,
}

impl App {
    pub fn new(
        initial: &str,
        config: &PlaygroundConfig,
        analyzer: Arc<dyn Analyzer>,
        tx: mpsc::Sender<AnalysisEvent>,
    ) -> Self {
        Self {
            editor: Editor::with_text(initial),
            generation: 0,
            applied_generation: None,
            dispatched_generation: None,
            focus: Focus::Editor,
            tabs: TabState::default(),
            outputs: TabOutputs::uniform(LOADING_TEXT),
            scroll: ScrollState::default(),
            debouncer: Debouncer::new(config.debounce, tx.clone()),
            dispatcher: AnalysisDispatcher::new(analyzer, tx, config.analysis_timeout),
            in_flight: 0,
            last_status: None,
            last_meta: None,
            size: (0, 0),
            output_height: 0,
            should_quit: false,
        }
    }

    /// Schedules analysis of the startup content.
    pub fn start(&mut self) {
        self.schedule_analysis();
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn active_tab(&self) -> Tab {
        self.tabs.active()
    }

    #[cfg(test)]
    pub fn outputs(&self) -> &TabOutputs {
        &self.outputs
    }

    pub fn active_text(&self) -> &str {
        self.outputs.get(self.tabs.active())
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll.offset()
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn is_pending(&self) -> bool {
        self.applied_generation != Some(self.generation)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_status(&self) -> Option<AnalysisStatus> {
        self.last_status
    }

    pub fn last_meta(&self) -> Option<&AnalyzerMeta> {
        self.last_meta.as_ref()
    }

    /// Called by the renderer with the number of text rows in the output pane.
    pub fn set_output_height(&mut self, height: usize) {
        self.output_height = height;
        self.clamp_scroll();
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    self.handle_key(key);
                }
            }
            Event::Paste(text) => {
                if self.focus == Focus::Editor && !text.is_empty() {
                    self.editor.insert_str(&text);
                    self.content_changed();
                }
            }
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.quit();
                    return;
                }
                KeyCode::Char('r') => {
                    self.force_refresh();
                    return;
                }
                _ => {}
            }
        }

        if key.code == KeyCode::Tab {
            self.toggle_focus();
            return;
        }

        match self.focus {
            Focus::Editor => {
                if self.editor.handle_key(key) {
                    self.content_changed();
                }
            }
            Focus::Output => self.handle_output_key(key),
        }
    }

    fn handle_output_key(&mut self, key: KeyEvent) {
        let lines = line_count(self.active_text());
        let height = self.output_height;
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Left | KeyCode::Char('h') => {
                if self.tabs.previous() {
                    self.tab_changed();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.tabs.next() {
                    self.tab_changed();
                }
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if let Some(tab) = Tab::from_digit(ch) {
                    if self.tabs.select(tab) {
                        self.tab_changed();
                    }
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll.scroll_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll.scroll_down(1, lines, height),
            KeyCode::PageUp => self.scroll.page_up(),
            KeyCode::PageDown => self.scroll.page_down(lines, height),
            KeyCode::Home | KeyCode::Char('g') => self.scroll.home(),
            KeyCode::End | KeyCode::Char('G') => self.scroll.end(lines, height),
            _ => {}
        }
    }

    pub fn handle_analysis_event(&mut self, event: AnalysisEvent) {
        match event {
            AnalysisEvent::DebounceFired(request) => {
                if request.generation != self.generation {
                    debug!(
                        fired = request.generation,
                        current = self.generation,
                        "dropping superseded debounce fire"
                    );
                    return;
                }
                if self.dispatched_generation == Some(request.generation) {
                    debug!(
                        generation = request.generation,
                        "generation already dispatched; dropping debounce fire"
                    );
                    return;
                }
                self.dispatch(request);
            }
            AnalysisEvent::Completed(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if result.generation != self.generation {
                    debug!(
                        result = result.generation,
                        current = self.generation,
                        "discarding stale analysis result"
                    );
                    return;
                }
                self.apply_result(result);
            }
        }
    }

    fn tab_changed(&mut self) {
        debug!(tab = self.tabs.active().key(), "active tab changed");
        self.scroll.reset();
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Editor => Focus::Output,
            Focus::Output => Focus::Editor,
        };
    }

    fn resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "terminal resized");
        self.size = (width, height);
        self.clamp_scroll();
    }

    fn quit(&mut self) {
        if self.debouncer.cancel() {
            debug!("pending analysis cancelled on quit");
        }
        self.should_quit = true;
    }

    fn content_changed(&mut self) {
        self.generation += 1;
        self.schedule_analysis();
    }

    fn snapshot(&self) -> AnalysisRequest {
        AnalysisRequest::new(self.generation, self.editor.value())
    }

    fn schedule_analysis(&mut self) {
        let request = self.snapshot();
        if request.is_blank() {
            self.debouncer.cancel();
            self.apply_result(AnalysisResult::placeholder(&request));
            return;
        }
        self.debouncer.arm(request);
    }

    fn force_refresh(&mut self) {
        self.debouncer.cancel();
        let request = self.snapshot();
        if request.is_blank() {
            self.apply_result(AnalysisResult::placeholder(&request));
            return;
        }
        info!(generation = request.generation, "forced analysis");
        self.dispatch(request);
    }

    fn dispatch(&mut self, request: AnalysisRequest) {
        self.dispatched_generation = Some(request.generation);
        self.in_flight += 1;
        self.dispatcher.dispatch(request);
    }

    fn apply_result(&mut self, result: AnalysisResult) {
        info!(
            generation = result.generation,
            success = result.success(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "applying analysis result"
        );
        self.outputs = result.outputs;
        self.applied_generation = Some(result.generation);
        self.last_status = Some(result.status);
        self.last_meta = result.meta;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let lines = line_count(self.active_text());
        self.scroll.clamp(lines, self.output_height);
    }
}
