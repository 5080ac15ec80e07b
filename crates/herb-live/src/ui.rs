use crate::app::{App, Focus};
use crate::theme;
use herb_live_core::{visible_window, AnalysisStatus, Tab};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const EDITOR_HEADER: &str = "📝 HTML+ERB File";
const EDITOR_PLACEHOLDER: &str = "Enter your ERB code here...";
const HELP_TEXT: &str =
    "Tab: switch pane • ←/→ or 1-5: tabs • ↑/↓ PgUp/PgDn: scroll • Ctrl+R: re-run • q / Ctrl+C: quit";
const HELP_TEXT_SHORT: &str = "Tab • 1-5 • ↑/↓ • Ctrl+R • Ctrl+C";

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_editor(f, app, panes[0]);
    render_output(f, app, panes[1]);

    let help = if HELP_TEXT.width() <= app.size().0 as usize {
        HELP_TEXT
    } else {
        HELP_TEXT_SHORT
    };
    let help = Paragraph::new(Line::from(Span::styled(help, theme::HELP_STYLE)));
    f.render_widget(help, rows[1]);
}

fn render_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        EDITOR_HEADER,
        theme::HEADER_STYLE,
    )));
    f.render_widget(header, parts[0]);

    let focused = app.focus() == Focus::Editor;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            theme::EDITOR_BORDER_FOCUSED
        } else {
            theme::EDITOR_BORDER
        });
    let inner = block.inner(parts[1]);
    f.render_widget(block, parts[1]);

    let height = inner.height as usize;
    let top = app.editor_mut().scroll_top(height);
    let editor = app.editor();

    if editor.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            EDITOR_PLACEHOLDER,
            theme::PLACEHOLDER_STYLE,
        ));
        f.render_widget(placeholder, inner);
    } else {
        let end = editor.line_count().min(top + height);
        let lines: Vec<Line> = (top..end).map(|row| Line::from(editor.line(row))).collect();
        f.render_widget(Paragraph::new(lines), inner);
    }

    if focused && inner.width > 0 && inner.height > 0 {
        let (row, col) = editor.cursor();
        let before: String = editor.line(row).chars().take(col).collect();
        let x = (before.width() as u16).min(inner.width - 1);
        let y = (row - top) as u16;
        f.set_cursor(inner.x + x, inner.y + y);
    }
}

fn render_output(f: &mut Frame, app: &mut App, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let focused = app.focus() == Focus::Output;
    f.render_widget(Paragraph::new(tab_bar(app.active_tab(), focused)), parts[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(status_title(app))
        .border_style(if focused {
            theme::OUTPUT_BORDER_FOCUSED
        } else {
            theme::OUTPUT_BORDER
        });
    let inner = block.inner(parts[1]);
    f.render_widget(block, parts[1]);

    let height = inner.height as usize;
    app.set_output_height(height);

    let text = visible_window(app.active_text(), app.scroll_offset(), height);
    let style = if app.last_status() == Some(AnalysisStatus::Empty) {
        theme::PLACEHOLDER_STYLE
    } else {
        Style::default()
    };
    let lines: Vec<Line> = text
        .split('\n')
        .map(|line| Line::styled(line.to_string(), style))
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn tab_bar(active: Tab, focused: bool) -> Line<'static> {
    let mut spans = Vec::with_capacity(Tab::COUNT * 2);
    for tab in Tab::ALL {
        let style = if tab != active {
            theme::TAB_STYLE
        } else if focused {
            theme::TAB_ACTIVE_FOCUSED_STYLE
        } else {
            theme::TAB_ACTIVE_STYLE
        };
        spans.push(Span::styled(
            format!(" {} {} ", tab.icon(), tab.title()),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn status_title(app: &App) -> Line<'static> {
    let pending = app.is_pending();
    let label = if pending && app.in_flight() > 0 {
        "analyzing...".to_string()
    } else if pending {
        "waiting for input to settle".to_string()
    } else {
        match (app.last_status(), app.last_meta()) {
            (Some(AnalysisStatus::Ready), Some(meta)) => {
                format!("herb {} · {:.2} ms", meta.version, meta.duration_ms)
            }
            (Some(AnalysisStatus::Ready), None) => "ready".to_string(),
            (Some(AnalysisStatus::Failed(kind)), _) => kind.label().to_string(),
            (Some(AnalysisStatus::Empty), _) | (None, _) => String::new(),
        }
    };

    let mut spans = vec![Span::raw(" Output ")];
    if !label.is_empty() {
        spans.push(Span::styled(
            format!("· {label} "),
            Style::new().fg(theme::status_color(app.last_status(), pending)),
        ));
    }
    Line::from(spans)
}
