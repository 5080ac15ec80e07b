use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ropey::Rope;

/// Multi-line text buffer behind the editing pane. The cursor column is a
/// char index into the current line; only `\n` breaks lines.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    text: Rope,
    row: usize,
    col: usize,
    top: usize,
}

impl Editor {
    pub fn with_text(text: &str) -> Self {
        let mut editor = Self::default();
        editor.set_value(text);
        editor
    }

    pub fn value(&self) -> String {
        self.text.to_string()
    }

    /// Replaces the whole buffer and parks the cursor after the last char.
    pub fn set_value(&mut self, text: &str) {
        self.text = Rope::from_str(&text.replace("\r\n", "\n"));
        self.row = self.line_count() - 1;
        self.col = self.line_len(self.row);
        self.top = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.text.len_chars() == 0
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Line `row` without its trailing newline.
    pub fn line(&self, row: usize) -> String {
        let mut line = self.text.line(row).to_string();
        if line.ends_with('\n') {
            line.pop();
        }
        line
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// First visible row for a pane `height` rows tall, moved just enough to
    /// keep the cursor on screen.
    pub fn scroll_top(&mut self, height: usize) -> usize {
        if height == 0 {
            return self.top;
        }
        if self.row < self.top {
            self.top = self.row;
        } else if self.row >= self.top + height {
            self.top = self.row + 1 - height;
        }
        self.top
    }

    /// Applies an editing key. Returns true when the text changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(ch) => {
                self.insert_char(ch);
                true
            }
            KeyCode::Enter => {
                self.newline();
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                self.move_left();
                false
            }
            KeyCode::Right => {
                self.move_right();
                false
            }
            KeyCode::Up => {
                self.move_vertical(-1);
                false
            }
            KeyCode::Down => {
                self.move_vertical(1);
                false
            }
            KeyCode::Home => {
                self.col = 0;
                false
            }
            KeyCode::End => {
                self.col = self.line_len(self.row);
                false
            }
            _ => false,
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.insert_char(self.cursor_char(), ch);
        if ch == '\n' {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.text.insert(self.cursor_char(), &normalized);
        match normalized.rsplit_once('\n') {
            Some((_, tail)) => {
                self.row += normalized.matches('\n').count();
                self.col = tail.chars().count();
            }
            None => self.col += normalized.chars().count(),
        }
    }

    pub fn newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) -> bool {
        let at = self.cursor_char();
        if at == 0 {
            return false;
        }
        if self.col > 0 {
            self.col -= 1;
        } else {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
        self.text.remove(at - 1..at);
        true
    }

    pub fn delete(&mut self) -> bool {
        let at = self.cursor_char();
        if at >= self.text.len_chars() {
            return false;
        }
        self.text.remove(at..at + 1);
        true
    }

    fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.line_count() {
            self.row += 1;
            self.col = 0;
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let target = self.row as isize + delta;
        if target < 0 || target as usize >= self.line_count() {
            return;
        }
        self.row = target as usize;
        self.col = self.col.min(self.line_len(self.row));
    }

    fn line_len(&self, row: usize) -> usize {
        let line = self.text.line(row);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn cursor_char(&self) -> usize {
        self.text.line_to_char(self.row) + self.col
    }
}
