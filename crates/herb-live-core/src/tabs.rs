/// Output channels shown in the right-hand pane, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Linter,
    Parse,
    Lex,
    Ruby,
    Html,
}

impl Tab {
    pub const COUNT: usize = 5;
    pub const ALL: [Tab; Tab::COUNT] = [Tab::Linter, Tab::Parse, Tab::Lex, Tab::Ruby, Tab::Html];

    pub fn index(self) -> usize {
        match self {
            Tab::Linter => 0,
            Tab::Parse => 1,
            Tab::Lex => 2,
            Tab::Ruby => 3,
            Tab::Html => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Maps the digit keys `1`..=`5` onto tabs; anything else is ignored.
    pub fn from_digit(ch: char) -> Option<Self> {
        let digit = ch.to_digit(10)? as usize;
        digit.checked_sub(1).and_then(Self::from_index)
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Linter => "Linter",
            Tab::Parse => "Parse",
            Tab::Lex => "Lex",
            Tab::Ruby => "Ruby",
            Tab::Html => "HTML",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Tab::Linter => "🔍",
            Tab::Parse => "🌳",
            Tab::Lex => "📝",
            Tab::Ruby => "💎",
            Tab::Html => "🏷️",
        }
    }

    /// Stable identifier, matching the analyzer's output field.
    pub fn key(self) -> &'static str {
        match self {
            Tab::Linter => "linter",
            Tab::Parse => "parse",
            Tab::Lex => "lex",
            Tab::Ruby => "ruby",
            Tab::Html => "html",
        }
    }

    /// Text shown while the buffer is blank.
    pub fn placeholder(self) -> &'static str {
        match self {
            Tab::Linter => "Enter ERB code to see linter results...",
            Tab::Parse => "Enter ERB code to see parse result...",
            Tab::Lex => "Enter ERB code to see lex result...",
            Tab::Ruby => "Enter ERB code to see extracted Ruby...",
            Tab::Html => "Enter ERB code to see extracted HTML...",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabState {
    active: Tab,
}

impl TabState {
    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn next(&mut self) -> bool {
        let next = (self.active.index() + 1).min(Tab::COUNT - 1);
        self.select_index(next)
    }

    pub fn previous(&mut self) -> bool {
        let previous = self.active.index().saturating_sub(1);
        self.select_index(previous)
    }

    pub fn select(&mut self, tab: Tab) -> bool {
        if self.active == tab {
            return false;
        }
        self.active = tab;
        true
    }

    fn select_index(&mut self, index: usize) -> bool {
        match Tab::from_index(index) {
            Some(tab) => self.select(tab),
            None => false,
        }
    }
}

/// One text per tab. Entries are overwritten in place, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabOutputs([String; Tab::COUNT]);

impl TabOutputs {
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self(std::array::from_fn(|_| text.clone()))
    }

    pub fn placeholders() -> Self {
        Self(std::array::from_fn(|idx| Tab::ALL[idx].placeholder().to_string()))
    }

    pub fn get(&self, tab: Tab) -> &str {
        &self.0[tab.index()]
    }

    pub fn set(&mut self, tab: Tab, text: impl Into<String>) {
        self.0[tab.index()] = text.into();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tab, &str)> {
        Tab::ALL.into_iter().map(move |tab| (tab, self.get(tab)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_tabs_in_order() {
        assert_eq!(Tab::from_digit('1'), Some(Tab::Linter));
        assert_eq!(Tab::from_digit('3'), Some(Tab::Lex));
        assert_eq!(Tab::from_digit('5'), Some(Tab::Html));
        assert_eq!(Tab::from_digit('0'), None);
        assert_eq!(Tab::from_digit('6'), None);
        assert_eq!(Tab::from_digit('x'), None);
    }

    #[test]
    fn next_and_previous_clamp_at_the_ends() {
        let mut state = TabState::default();
        assert!(!state.previous());
        assert_eq!(state.active(), Tab::Linter);

        for _ in 0..10 {
            state.next();
        }
        assert_eq!(state.active(), Tab::Html);
        assert!(!state.next());

        assert!(state.previous());
        assert_eq!(state.active(), Tab::Ruby);
    }

    #[test]
    fn selecting_the_active_tab_reports_no_change() {
        let mut state = TabState::default();
        assert!(!state.select(Tab::Linter));
        assert!(state.select(Tab::Parse));
        assert!(!state.select(Tab::Parse));
    }

    #[test]
    fn placeholders_are_tab_specific() {
        let outputs = TabOutputs::placeholders();
        for (tab, text) in outputs.iter() {
            assert_eq!(text, tab.placeholder());
        }
        assert_ne!(outputs.get(Tab::Ruby), outputs.get(Tab::Html));
    }
}
