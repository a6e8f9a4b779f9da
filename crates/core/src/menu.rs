//! Single-level menu with incremental search.

use crate::command_definitions::CommandMetadata;
use crate::config::{MatchMode, SessionConfig};
use crate::engine::{
    header_line, log_outcome, pad_to_width_of, Action, Event, Frame, Key, Line, Model, Outcome,
    Role, Span, Viewport,
};
use crate::search::{filter_indices, Matcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Shown, but cannot be selected.
    pub disabled: bool,
    pub metadata: Option<CommandMetadata>,
}

impl MenuEntry {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            disabled: false,
            metadata: None,
        }
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Option<CommandMetadata>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuMode {
    Browsing,
    Searching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuStatus {
    Active,
    Selected(usize),
    Cancelled,
}

/// Rows taken by everything except the entry list.
const CHROME_ROWS: u16 = 5;

const BROWSING_HELP: &str = "↑/k ↓/j: Move   enter: Select   /: Search   esc/q: Quit";
const SEARCHING_HELP: &str = "type to filter   enter: Select   esc: Clear search   ctrl+c: Quit";

/// One menu level: pick an entry, or cancel.
///
/// The outcome is the index of the chosen entry in the list the menu was
/// created with, independent of any filter applied at the time.
#[derive(Debug, Clone)]
pub struct MenuModel {
    title: String,
    entries: Vec<MenuEntry>,
    visible: Vec<usize>,
    cursor: usize,
    query: String,
    mode: MenuMode,
    match_mode: MatchMode,
    show_description: bool,
    viewport: Viewport,
    status: MenuStatus,
}

impl MenuModel {
    pub fn new(title: impl Into<String>, entries: Vec<MenuEntry>) -> Self {
        let visible = (0..entries.len()).collect();
        Self {
            title: title.into(),
            entries,
            visible,
            cursor: 0,
            query: String::new(),
            mode: MenuMode::Browsing,
            match_mode: MatchMode::Substring,
            show_description: true,
            viewport: Viewport::default(),
            status: MenuStatus::Active,
        }
    }

    #[must_use]
    pub fn configured(mut self, config: &SessionConfig) -> Self {
        self.match_mode = config.match_mode;
        self.show_description = config.show_description;
        self
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Entries currently shown, in their original order.
    #[must_use]
    pub fn visible_entries(&self) -> Vec<&MenuEntry> {
        self.visible.iter().map(|index| &self.entries[*index]).collect()
    }

    fn set_query(&mut self, query: String) {
        self.query = query;
        self.visible = filter_indices(&self.entries, &self.query, self.match_mode);
        self.cursor = 0;
    }

    fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_down(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    fn select(mut self) -> (Self, Option<Action>) {
        match self.visible.get(self.cursor) {
            Some(index) if !self.entries[*index].disabled => {
                self.status = MenuStatus::Selected(*index);
                (self, Some(Action::Quit))
            }
            _ => (self, Some(Action::Bell)),
        }
    }

    fn cancel(mut self) -> (Self, Option<Action>) {
        self.status = MenuStatus::Cancelled;
        (self, Some(Action::Quit))
    }

    fn update_browsing(mut self, key: Key) -> (Self, Option<Action>) {
        match key {
            Key::Up | Key::Char('k') => self.move_up(),
            Key::Down | Key::Char('j') => self.move_down(),
            Key::Enter | Key::Char(' ') => return self.select(),
            Key::Esc | Key::Char('q') | Key::Ctrl('c') => return self.cancel(),
            Key::Char('/') | Key::Ctrl('s') => self.mode = MenuMode::Searching,
            _ => {}
        }
        (self, None)
    }

    fn update_searching(mut self, key: Key) -> (Self, Option<Action>) {
        match key {
            Key::Up => self.move_up(),
            Key::Down => self.move_down(),
            Key::Enter => return self.select(),
            Key::Ctrl('c') => return self.cancel(),
            Key::Esc => {
                self.set_query(String::new());
                self.mode = MenuMode::Browsing;
            }
            Key::Backspace => {
                let mut query = self.query.clone();
                if query.pop().is_some() {
                    self.set_query(query);
                }
            }
            Key::Ctrl('u') => {
                if !self.query.is_empty() {
                    self.set_query(String::new());
                }
            }
            Key::Char(c) => {
                let mut query = self.query.clone();
                query.push(c);
                self.set_query(query);
            }
            _ => {}
        }
        (self, None)
    }

    fn list_rows(&self) -> usize {
        let description_rows = u16::from(self.show_description);
        let rows = self
            .viewport
            .height
            .saturating_sub(CHROME_ROWS + description_rows);
        usize::from(rows.max(1))
    }

    fn entry_spans(&self, entry: &MenuEntry, selected: bool) -> Vec<Span> {
        let base = if entry.disabled {
            Role::Disabled
        } else if selected {
            Role::Selected
        } else {
            Role::Plain
        };

        let prefix = if selected { "▶ " } else { "  " };
        let mut spans = vec![Span::new(prefix, base)];

        let matcher = Matcher::new(self.match_mode);
        let mut position = 0;
        for range in matcher.highlight(&entry.label, &self.query) {
            if range.start > position {
                spans.push(Span::new(&entry.label[position..range.start], base));
            }
            spans.push(Span::new(&entry.label[range.clone()], Role::Highlight));
            position = range.end;
        }
        if position < entry.label.len() {
            spans.push(Span::new(&entry.label[position..], base));
        }

        spans
    }
}

impl Model for MenuModel {
    type Output = usize;

    fn update(self, event: Event) -> (Self, Option<Action>) {
        match event {
            Event::Resize(width, height) => {
                let mut model = self;
                model.viewport = Viewport { width, height };
                (model, None)
            }
            Event::Key(key) => match self.mode {
                MenuMode::Browsing => self.update_browsing(key),
                MenuMode::Searching => self.update_searching(key),
            },
        }
    }

    fn view(&self) -> Frame {
        let mut frame = Frame::default();
        let count = self.visible.len();
        let position = if count == 0 { 0 } else { self.cursor + 1 };

        let instructions = match self.mode {
            MenuMode::Browsing => format!(
                "/: Search   |   {}/{}   |   q: Quit",
                pad_to_width_of(position, count),
                count
            ),
            MenuMode::Searching => format!(
                "<esc>: Stop Searching   |   {}/{}",
                pad_to_width_of(position, count),
                count
            ),
        };
        frame.push(header_line(&instructions, self.viewport.width));
        frame.push(Line::styled(self.title.clone(), Role::Title));

        if self.mode == MenuMode::Searching {
            frame.push(Line::new(vec![
                Span::new("Search: ", Role::Muted),
                Span::plain(self.query.clone()),
            ]));
        } else {
            frame.push(Line::blank());
        }

        if self.visible.is_empty() {
            frame.push(Line::styled("No matching commands found", Role::Error));
        } else {
            let rows = self.list_rows();
            let start = if self.cursor < rows {
                0
            } else {
                self.cursor + 1 - rows
            };

            for (offset, index) in self.visible.iter().enumerate().skip(start).take(rows) {
                let entry = &self.entries[*index];
                let selected = offset == self.cursor;
                let line = Line::new(self.entry_spans(entry, selected));
                frame.push(if selected {
                    line
                } else {
                    line.with_colors(entry.metadata.clone())
                });
            }

            if self.show_description {
                let description = self
                    .visible
                    .get(self.cursor)
                    .map(|index| self.entries[*index].description.as_str())
                    .unwrap_or_default();
                frame.push(Line::styled(format!("    {description}"), Role::Muted));
            }
        }

        let help = match self.mode {
            MenuMode::Browsing => BROWSING_HELP,
            MenuMode::Searching => SEARCHING_HELP,
        };
        frame.push(Line::styled(help, Role::Help));

        frame
    }

    fn finish(self) -> Outcome<usize> {
        let outcome = match self.status {
            MenuStatus::Selected(index) => Outcome::Completed(index),
            MenuStatus::Active | MenuStatus::Cancelled => Outcome::Cancelled,
        };
        log_outcome("Menu", &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::run_model;
    use crate::engine::testing::ScriptedScreen;

    fn items() -> Vec<MenuEntry> {
        vec![
            MenuEntry::new("alpha", "alpha", "First"),
            MenuEntry::new("beta", "beta", "Second"),
            MenuEntry::new("gamma", "gamma", "Third").disabled(true),
            MenuEntry::new("delta", "delta", "Fourth"),
        ]
    }

    fn press(model: MenuModel, keys: &[Key]) -> MenuModel {
        keys.iter()
            .fold(model, |model, key| model.update(Event::Key(*key)).0)
    }

    #[test]
    fn test_cursor_is_clamped() {
        let model = press(MenuModel::new("Menu", items()), &[Key::Up, Key::Up]);
        assert_eq!(model.cursor(), 0);

        let model = press(model, &[Key::Down; 10]);
        assert_eq!(model.cursor(), 3);
    }

    #[test]
    fn test_select_returns_original_index() {
        let mut keys = vec![Key::Char('/')];
        keys.extend(ScriptedScreen::typed("del"));
        keys.push(Key::Enter);
        let mut screen = ScriptedScreen::new(&keys);

        let outcome = run_model(MenuModel::new("Menu", items()), &mut screen).unwrap();
        assert_eq!(outcome, Outcome::Completed(3));
    }

    #[test]
    fn test_disabled_entry_rings_bell() {
        let mut screen = ScriptedScreen::new(&[Key::Down, Key::Down, Key::Enter, Key::Esc]);
        let outcome = run_model(MenuModel::new("Menu", items()), &mut screen).unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(screen.bells, 1);
    }

    #[test]
    fn test_typing_then_backspace_restores_list() {
        let model = press(MenuModel::new("Menu", items()), &[Key::Char('/'), Key::Down]);
        let model = press(model, &[Key::Char('p')]);
        assert_eq!(model.cursor(), 0);
        assert_eq!(model.visible_entries().len(), 1);

        let model = press(model, &[Key::Backspace]);
        assert_eq!(model.query(), "");
        assert_eq!(model.cursor(), 0);
        assert_eq!(model.visible_entries().len(), 4);
    }

    #[test]
    fn test_escape_leaves_search() {
        let model = press(
            MenuModel::new("Menu", items()),
            &[Key::Char('/'), Key::Char('z'), Key::Esc],
        );
        assert_eq!(model.mode(), MenuMode::Browsing);
        assert_eq!(model.query(), "");
        assert_eq!(model.visible_entries().len(), 4);
    }

    #[test]
    fn test_search_keys_are_text() {
        let model = press(
            MenuModel::new("Menu", items()),
            &[Key::Char('/'), Key::Char('q'), Key::Char('j')],
        );
        assert_eq!(model.query(), "qj");
        assert!(model.visible_entries().is_empty());
        assert!(model.view().text().contains("No matching commands found"));

        let (model, action) = model.update(Event::Key(Key::Enter));
        assert_eq!(action, Some(Action::Bell));

        let model = press(model, &[Key::Ctrl('u')]);
        assert_eq!(model.visible_entries().len(), 4);
    }

    #[test]
    fn test_cancel_keys() {
        for key in [Key::Esc, Key::Char('q'), Key::Ctrl('c')] {
            let (model, action) = MenuModel::new("Menu", items()).update(Event::Key(key));
            assert_eq!(action, Some(Action::Quit));
            assert_eq!(model.finish(), Outcome::Cancelled);
        }
    }

    #[test]
    fn test_resize_keeps_state() {
        let model = press(
            MenuModel::new("Menu", items()),
            &[Key::Char('/'), Key::Char('a'), Key::Down],
        );
        let (model, action) = model.update(Event::Resize(120, 40));
        assert_eq!(action, None);
        assert_eq!(model.cursor(), 1);
        assert_eq!(model.query(), "a");
        assert_eq!(model.viewport(), Viewport { width: 120, height: 40 });
    }

    #[test]
    fn test_view_marks_selection_and_description() {
        let model = press(MenuModel::new("Pick one", items()), &[Key::Down]);
        let text = model.view().text();
        assert!(text.contains("Pick one"));
        assert!(text.contains("▶ beta"));
        assert!(text.contains("  alpha"));
        assert!(text.contains("    Second"));
        assert!(text.contains("2/4"));
    }

    #[test]
    fn test_view_scrolls_to_cursor() {
        let entries: Vec<MenuEntry> = (0..30)
            .map(|i| MenuEntry::new(format!("{i}"), format!("item-{i:02}"), ""))
            .collect();
        let (model, _) = MenuModel::new("Long", entries).update(Event::Resize(80, 10));
        let model = press(model, &[Key::Down; 20]);
        let text = model.view().text();
        assert!(text.contains("▶ item-20"));
        assert!(!text.contains("item-00"));
    }

    #[test]
    fn test_view_highlights_query() {
        let model = press(MenuModel::new("Menu", items()), &[Key::Char('/'), Key::Char('e')]);
        let frame = model.view();
        let highlighted: Vec<&str> = frame
            .lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.role == Role::Highlight)
            .map(|span| span.text.as_str())
            .collect();
        assert_eq!(highlighted, vec!["e", "e"]);
    }
}
