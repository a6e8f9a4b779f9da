//! The cooperative render loop.
//!
//! A [`Model`] is a state machine with a pure transition (`update`) and a pure
//! render (`view`). [`run_model`] owns all I/O: it pulls one event at a time
//! from a [`Screen`], feeds it through `update`, and draws the resulting
//! [`Frame`] only when it differs from the last one drawn.

use std::fmt::Display;

use log::debug;

use crate::command_definitions::CommandMetadata;
use crate::error::Result;

/// Keys the state machines understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Backspace,
    Tab,
    BackTab,
    Char(char),
    /// A letter pressed with Control held.
    Ctrl(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(Key),
    Resize(u16, u16),
}

impl From<Key> for Event {
    fn from(key: Key) -> Self {
        Event::Key(key)
    }
}

/// Follow-up requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The model reached a terminal state.
    Quit,
    /// The input was refused; ring the terminal bell.
    Bell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

/// Semantic style of a span. Screens map roles to colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Plain,
    Title,
    Header,
    Selected,
    Disabled,
    Highlight,
    Help,
    Error,
    Success,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub role: Role,
}

impl Span {
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Role::Plain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
    /// Custom colours from the catalog, applied when the line is not selected.
    pub colors: Option<CommandMetadata>,
}

impl Line {
    #[must_use]
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans,
            colors: None,
        }
    }

    pub fn styled(text: impl Into<String>, role: Role) -> Self {
        Self::new(vec![Span::new(text, role)])
    }

    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_colors(mut self, colors: Option<CommandMetadata>) -> Self {
        self.colors = colors;
        self
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Everything a screen needs to draw one state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub lines: Vec<Line>,
}

impl Frame {
    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// The frame as plain text, one line per row.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A state machine hosted by [`run_model`].
///
/// `update` and `view` must not perform I/O.
pub trait Model: Sized {
    type Output;

    fn init(&mut self) -> Option<Action> {
        None
    }

    fn update(self, event: Event) -> (Self, Option<Action>);

    fn view(&self) -> Frame;

    /// Final result once `update` has asked to quit.
    fn finish(self) -> Outcome<Self::Output>;
}

/// Terminal access used by the render loop.
///
/// Implementations report their failures as [`crate::error::Error::Render`].
pub trait Screen {
    fn size(&self) -> Result<Viewport>;

    fn enter(&mut self) -> Result<()>;

    /// Blocks until the next event.
    fn next_event(&mut self) -> Result<Event>;

    fn draw(&mut self, frame: &Frame) -> Result<()>;

    fn bell(&mut self) -> Result<()> {
        Ok(())
    }

    fn restore(&mut self) -> Result<()>;
}

/// Drives `model` until it quits.
///
/// The current terminal size is delivered first, as a resize event.
///
/// # Errors
///
/// Any screen failure aborts the loop and is returned unchanged.
pub fn run_model<M, S>(model: M, screen: &mut S) -> Result<Outcome<M::Output>>
where
    M: Model,
    S: Screen + ?Sized,
{
    let viewport = screen.size()?;
    let (mut model, _) = model.update(Event::Resize(viewport.width, viewport.height));
    let mut action = model.init();
    let mut last_frame: Option<Frame> = None;

    loop {
        match action.take() {
            Some(Action::Quit) => break,
            Some(Action::Bell) => screen.bell()?,
            None => {}
        }

        let frame = model.view();
        let should_redraw = last_frame.as_ref() != Some(&frame);
        if should_redraw {
            screen.draw(&frame)?;
            last_frame = Some(frame);
        }

        let event = screen.next_event()?;
        let (next, next_action) = model.update(event);
        model = next;
        action = next_action;
    }

    Ok(model.finish())
}

/// Pad a value to match the width of the largest value.
pub(crate) fn pad_to_width_of<T: Display>(value: T, max_number: usize) -> String {
    let width = format!("{max_number}").len();
    format!("{:>width$}", value.to_string())
}

/// Status bar shown on the first row of every screen.
pub(crate) fn header_line(instructions: &str, width: u16) -> Line {
    let left_padding = "  ";
    let used = left_padding.len() + instructions.chars().count();
    let right_padding = " ".repeat((width as usize).saturating_sub(used));
    Line::styled(
        format!("{left_padding}{instructions}{right_padding}"),
        Role::Header,
    )
}

pub(crate) fn log_outcome<T>(model: &str, outcome: &Outcome<T>) {
    match outcome {
        Outcome::Completed(_) => debug!("{model} completed"),
        Outcome::Cancelled => debug!("{model} cancelled"),
    }
}
