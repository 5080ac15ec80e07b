use herb_live_core::{AnalysisErrorKind, AnalysisStatus};
use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const HELP_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));

pub const EDITOR_BORDER: Style = Style::new().fg(Color::Rgb(69, 133, 136));
pub const EDITOR_BORDER_FOCUSED: Style = Style::new()
    .fg(Color::Rgb(131, 165, 152))
    .add_modifier(Modifier::BOLD);
pub const OUTPUT_BORDER: Style = Style::new().fg(Color::Rgb(177, 98, 134));
pub const OUTPUT_BORDER_FOCUSED: Style = Style::new()
    .fg(Color::Rgb(211, 134, 155))
    .add_modifier(Modifier::BOLD);

pub const TAB_STYLE: Style = Style::new()
    .bg(Color::Rgb(60, 56, 54))
    .fg(Color::Rgb(235, 219, 178));
pub const TAB_ACTIVE_STYLE: Style = Style::new()
    .bg(Color::Rgb(69, 133, 136))
    .fg(Color::Rgb(251, 241, 199))
    .add_modifier(Modifier::BOLD);
pub const TAB_ACTIVE_FOCUSED_STYLE: Style = Style::new()
    .bg(Color::Rgb(177, 98, 134))
    .fg(Color::Rgb(251, 241, 199))
    .add_modifier(Modifier::BOLD);

pub const PLACEHOLDER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub fn status_color(status: Option<AnalysisStatus>, pending: bool) -> Color {
    if pending {
        return Color::Rgb(250, 189, 47);
    }
    match status {
        Some(AnalysisStatus::Ready) => Color::Rgb(184, 187, 38),
        Some(AnalysisStatus::Failed(AnalysisErrorKind::ToolUnavailable)) => {
            Color::Rgb(254, 128, 25)
        }
        Some(AnalysisStatus::Failed(_)) => Color::Rgb(214, 93, 14),
        Some(AnalysisStatus::Empty) | None => Color::Rgb(146, 131, 116),
    }
}
