pub const PAGE_STRIDE: usize = 10;

pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

pub fn max_offset(lines: usize, height: usize) -> usize {
    lines.saturating_sub(height)
}

/// Scroll position of the output pane. Every mutator keeps
/// `offset <= max_offset(lines, height)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
}

impl ScrollState {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn scroll_down(&mut self, step: usize, lines: usize, height: usize) {
        self.offset = self
            .offset
            .saturating_add(step)
            .min(max_offset(lines, height));
    }

    pub fn scroll_up(&mut self, step: usize) {
        self.offset = self.offset.saturating_sub(step);
    }

    pub fn page_down(&mut self, lines: usize, height: usize) {
        self.scroll_down(PAGE_STRIDE, lines, height);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(PAGE_STRIDE);
    }

    pub fn home(&mut self) {
        self.offset = 0;
    }

    pub fn end(&mut self, lines: usize, height: usize) {
        self.offset = max_offset(lines, height);
    }

    pub fn clamp(&mut self, lines: usize, height: usize) {
        self.offset = self.offset.min(max_offset(lines, height));
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

/// Slice of `text` visible at `offset` within `height` rows. When the text
/// does not fit, the last visible line carries a `[X-Y of Z lines]` marker.
pub fn visible_window(text: &str, offset: usize, height: usize) -> String {
    if height == 0 {
        return String::new();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let total = lines.len();
    let start = offset.min(max_offset(total, height));
    let end = total.min(start + height);
    let mut visible: Vec<String> = lines[start..end].iter().map(|line| line.to_string()).collect();

    if total > height {
        if let Some(last) = visible.last_mut() {
            last.push_str(&format!(" [{}-{} of {} lines]", start + 1, end, total));
        }
    }

    visible.join("\n")
}
