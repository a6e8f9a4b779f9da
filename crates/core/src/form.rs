//! Parameter form: review, toggle and edit values before running a command.

use indexmap::IndexMap;

use crate::command_definitions::ParameterType;
use crate::engine::{
    header_line, log_outcome, Action, Event, Frame, Key, Line, Model, Outcome, Role, Span,
    Viewport,
};
use crate::parameters::ParameterSpec;

/// Header, title, blank, blank, message and help.
const CHROME_ROWS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Navigating,
    Editing { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormStatus {
    Active,
    Submitted,
    Cancelled,
}

/// Collects one string value per parameter.
///
/// Values start at each parameter's current value. Bools and enums with
/// options are changed in place; everything else goes through an edit buffer
/// and is only committed once it validates.
#[derive(Debug, Clone)]
pub struct FormModel {
    title: String,
    parameters: Vec<ParameterSpec>,
    values: IndexMap<String, String>,
    cursor: usize,
    mode: FormMode,
    buffer: String,
    message: Option<String>,
    grouped: bool,
    viewport: Viewport,
    status: FormStatus,
}

impl FormModel {
    pub fn new(title: impl Into<String>, parameters: Vec<ParameterSpec>) -> Self {
        let values = parameters
            .iter()
            .map(|spec| (spec.name.clone(), spec.current_value.clone()))
            .collect();

        Self {
            title: title.into(),
            parameters,
            values,
            cursor: 0,
            mode: FormMode::Navigating,
            buffer: String::new(),
            message: None,
            grouped: false,
            viewport: Viewport::default(),
            status: FormStatus::Active,
        }
    }

    /// Shows parameters under a header per declaring scope.
    #[must_use]
    pub fn grouped(mut self, grouped: bool) -> Self {
        self.grouped = grouped;
        self
    }

    #[must_use]
    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn value_of<'a>(&'a self, spec: &'a ParameterSpec) -> &'a str {
        self.values
            .get(&spec.name)
            .map_or(spec.current_value.as_str(), String::as_str)
    }

    fn step_current(&mut self, forward: bool) {
        let Some(spec) = self.parameters.get(self.cursor) else {
            return;
        };

        if let Some(next) = spec.step(self.value_of(spec), forward) {
            self.values.insert(spec.name.clone(), next);
            self.message = None;
        }
    }

    fn start_editing(&mut self) -> Option<Action> {
        let spec = self.parameters.get(self.cursor)?;
        if spec.kind == ParameterType::Bool {
            return Some(Action::Bell);
        }

        self.buffer = self.value_of(spec).to_string();
        self.mode = FormMode::Editing { index: self.cursor };
        self.message = None;
        None
    }

    /// Refuses to finish while any value is missing or invalid, including
    /// values that were never touched.
    fn submit(&mut self) -> Option<Action> {
        let rejected = self.parameters.iter().enumerate().find_map(|(index, spec)| {
            let value = self.value_of(spec);
            if spec.required && value.is_empty() {
                return Some((index, format!("`{}` is required", spec.name)));
            }
            spec.validate(value).err().map(|e| (index, e.to_string()))
        });

        match rejected {
            Some((index, message)) => {
                self.message = Some(message);
                self.cursor = index;
                Some(Action::Bell)
            }
            None => {
                self.status = FormStatus::Submitted;
                Some(Action::Quit)
            }
        }
    }

    fn cancel(&mut self) -> Option<Action> {
        self.status = FormStatus::Cancelled;
        Some(Action::Quit)
    }

    fn update_navigating(&mut self, key: Key) -> Option<Action> {
        match key {
            Key::Up | Key::BackTab | Key::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            Key::Down | Key::Tab | Key::Char('j') => {
                if self.cursor + 1 < self.parameters.len() {
                    self.cursor += 1;
                }
            }
            Key::Left => self.step_current(false),
            Key::Right | Key::Char(' ') => self.step_current(true),
            Key::Char('e') => return self.start_editing(),
            Key::Enter => return self.submit(),
            Key::Esc | Key::Char('q') | Key::Ctrl('c') => return self.cancel(),
            _ => {}
        }
        None
    }

    fn update_editing(&mut self, index: usize, key: Key) -> Option<Action> {
        match key {
            Key::Char(c) => self.buffer.push(c),
            Key::Backspace => {
                self.buffer.pop();
            }
            Key::Ctrl('u') => self.buffer.clear(),
            Key::Ctrl('c') => return self.cancel(),
            Key::Esc => {
                self.buffer.clear();
                self.message = None;
                self.mode = FormMode::Navigating;
            }
            Key::Enter => {
                let spec = &self.parameters[index];
                match spec.validate(&self.buffer) {
                    Ok(()) => {
                        let value = std::mem::take(&mut self.buffer);
                        self.values.insert(spec.name.clone(), value);
                        self.message = None;
                        self.mode = FormMode::Navigating;
                    }
                    Err(e) => {
                        self.message = Some(e.to_string());
                        return Some(Action::Bell);
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn name_width(&self) -> usize {
        self.parameters
            .iter()
            .map(|spec| spec.name.chars().count())
            .max()
            .unwrap_or(0)
    }

    fn parameter_line(&self, index: usize, spec: &ParameterSpec, width: usize) -> Line {
        let selected = index == self.cursor;
        let role = if selected { Role::Selected } else { Role::Plain };
        let prefix = if selected { "▶ " } else { "  " };
        let marker = if spec.required { "*" } else { " " };

        let mut spans = vec![Span::new(
            format!("{prefix}{:<width$}{marker} : ", spec.name),
            role,
        )];

        match self.mode {
            FormMode::Editing { index: editing } if editing == index => {
                spans.push(Span::new(format!("{}▏", self.buffer), Role::Highlight));
            }
            _ => {
                let value = self.value_of(spec);
                if spec.kind == ParameterType::Bool {
                    let checkbox = if value == "true" { "[x]" } else { "[ ]" };
                    spans.push(Span::new(checkbox, role));
                } else {
                    spans.push(Span::new(value.to_string(), role));
                }
            }
        }

        spans.push(Span::new(format!("  ({})", spec.kind), Role::Muted));
        Line::new(spans)
    }
}

impl Model for FormModel {
    type Output = IndexMap<String, String>;

    fn update(mut self, event: Event) -> (Self, Option<Action>) {
        let action = match event {
            Event::Resize(width, height) => {
                self.viewport = Viewport { width, height };
                None
            }
            Event::Key(key) => match self.mode {
                FormMode::Navigating => self.update_navigating(key),
                FormMode::Editing { index } => self.update_editing(index, key),
            },
        };
        (self, action)
    }

    fn view(&self) -> Frame {
        let mut frame = Frame::default();

        let on_toggle = self
            .parameters
            .get(self.cursor)
            .is_some_and(ParameterSpec::is_toggle);
        let instructions = match self.mode {
            FormMode::Navigating if on_toggle => {
                "enter: Run   |   space: Toggle   |   esc: Cancel"
            }
            FormMode::Navigating => "enter: Run   |   e: Edit   |   esc: Cancel",
            FormMode::Editing { .. } => "enter: Save   |   esc: Discard",
        };
        frame.push(header_line(instructions, self.viewport.width));
        frame.push(Line::styled(self.title.clone(), Role::Title));
        frame.push(Line::blank());

        if self.parameters.is_empty() {
            frame.push(Line::styled("No parameters", Role::Muted));
        }

        let width = self.name_width();
        let mut rows = Vec::new();
        let mut cursor_end = 0;
        let mut scope: Option<&str> = None;
        for (index, spec) in self.parameters.iter().enumerate() {
            if self.grouped && scope != Some(spec.source_scope.as_str()) {
                scope = Some(spec.source_scope.as_str());
                rows.push(Line::styled(format!("── {} ──", spec.source_scope), Role::Header));
            }

            rows.push(self.parameter_line(index, spec, width));

            if index == self.cursor {
                if !spec.description.is_empty() {
                    rows.push(Line::styled(format!("    {}", spec.description), Role::Muted));
                }
                if !spec.options.is_empty() {
                    let options: Vec<&str> = spec.options.iter().map(|o| o.label()).collect();
                    rows.push(Line::styled(
                        format!("    options: {}", options.join(", ")),
                        Role::Muted,
                    ));
                }
                cursor_end = rows.len();
            }
        }

        // The selected row and its details stay in view.
        let available = usize::from(self.viewport.height)
            .saturating_sub(CHROME_ROWS)
            .max(1);
        let start = cursor_end.saturating_sub(available);
        frame.lines.extend(rows.into_iter().skip(start).take(available));

        frame.push(Line::blank());
        if let Some(message) = &self.message {
            frame.push(Line::styled(message.clone(), Role::Error));
        }

        let help = match self.mode {
            FormMode::Navigating => "↑/↓: Move   ←/→: Change   e: Edit   enter: Run   esc: Cancel",
            FormMode::Editing { .. } => "type a value   ctrl+u: Clear   enter: Save   esc: Discard",
        };
        frame.push(Line::styled(help, Role::Help));

        frame
    }

    fn finish(self) -> Outcome<IndexMap<String, String>> {
        let outcome = match self.status {
            FormStatus::Submitted => Outcome::Completed(self.values),
            FormStatus::Active | FormStatus::Cancelled => Outcome::Cancelled,
        };
        log_outcome("Form", &outcome);
        outcome
    }
}
