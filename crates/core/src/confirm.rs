//! Yes/no confirmation before a command is handed to the executor.

use crate::engine::{
    header_line, log_outcome, Action, Event, Frame, Key, Line, Model, Outcome, Role, Span,
    Viewport,
};

const CONFIRM: usize = 0;
const DENY: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmStatus {
    Active,
    Answered(bool),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ConfirmModel {
    title: String,
    message: String,
    cursor: usize,
    viewport: Viewport,
    status: ConfirmStatus,
}

impl ConfirmModel {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            cursor: CONFIRM,
            viewport: Viewport::default(),
            status: ConfirmStatus::Active,
        }
    }

    /// `true` while "confirm" is highlighted.
    #[must_use]
    pub fn confirming(&self) -> bool {
        self.cursor == CONFIRM
    }

    fn answer(&mut self, confirmed: bool) -> Option<Action> {
        self.status = ConfirmStatus::Answered(confirmed);
        Some(Action::Quit)
    }

    fn button(label: &str, selected: bool) -> Span {
        if selected {
            Span::new(format!("[ {label} ]"), Role::Selected)
        } else {
            Span::plain(format!("  {label}  "))
        }
    }
}

impl Model for ConfirmModel {
    type Output = bool;

    fn update(mut self, event: Event) -> (Self, Option<Action>) {
        let action = match event {
            Event::Resize(width, height) => {
                self.viewport = Viewport { width, height };
                None
            }
            Event::Key(key) => match key {
                Key::Left | Key::Char('h') => {
                    self.cursor = CONFIRM;
                    None
                }
                Key::Right | Key::Char('l') => {
                    self.cursor = DENY;
                    None
                }
                Key::Tab | Key::BackTab => {
                    self.cursor = if self.confirming() { DENY } else { CONFIRM };
                    None
                }
                Key::Char('y' | 'Y') => self.answer(true),
                Key::Char('n' | 'N') => self.answer(false),
                Key::Enter => {
                    let confirmed = self.confirming();
                    self.answer(confirmed)
                }
                Key::Esc | Key::Char('q') | Key::Ctrl('c') => {
                    self.status = ConfirmStatus::Cancelled;
                    Some(Action::Quit)
                }
                _ => None,
            },
        };
        (self, action)
    }

    fn view(&self) -> Frame {
        let mut frame = Frame::default();
        frame.push(header_line("y: Yes   |   n: No   |   esc: Cancel", self.viewport.width));
        frame.push(Line::styled(self.title.clone(), Role::Title));
        frame.push(Line::blank());

        for line in self.message.lines() {
            frame.push(Line::styled(line, Role::Plain));
        }

        frame.push(Line::blank());
        frame.push(Line::new(vec![
            Self::button("Yes", self.confirming()),
            Span::plain("   "),
            Self::button("No", !self.confirming()),
        ]));
        frame.push(Line::blank());
        frame.push(Line::styled(
            "←/→: Choose   enter: Answer   esc: Cancel",
            Role::Help,
        ));

        frame
    }

    fn finish(self) -> Outcome<bool> {
        let outcome = match self.status {
            ConfirmStatus::Answered(confirmed) => Outcome::Completed(confirmed),
            ConfirmStatus::Active | ConfirmStatus::Cancelled => Outcome::Cancelled,
        };
        log_outcome("Confirmation", &outcome);
        outcome
    }
}
