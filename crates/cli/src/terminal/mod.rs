//! Crossterm-backed [`Screen`].
//!
//! Sessions run on the alternate screen in raw mode. Whatever happens, the
//! terminal is put back when the screen is restored or dropped.

use std::io::{stdout, Stdout, Write};

use crossterm::cursor::{self, MoveTo, MoveToNextLine};
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{event, execute, queue};
use log::debug;

use command_deck_core::engine::{Event, Frame, Line, Role, Screen, Viewport};
use command_deck_core::error::{Error, Result};

use self::colors::{metadata_colors, Style, Theme};

pub mod colors;
pub mod input;

pub struct CrosstermScreen<W: Write = Stdout> {
    out: W,
    theme: Theme,
    entered: bool,
}

impl CrosstermScreen<Stdout> {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self::with_writer(stdout(), theme)
    }
}

impl<W: Write> CrosstermScreen<W> {
    /// Draws into `out` instead of standard output.
    pub fn with_writer(out: W, theme: Theme) -> Self {
        Self {
            out,
            theme,
            entered: false,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn queue_style(&mut self, style: Style) -> std::io::Result<()> {
        if let Some(foreground) = style.foreground {
            queue!(self.out, SetForegroundColor(foreground))?;
        }
        if let Some(background) = style.background {
            queue!(self.out, SetBackgroundColor(background))?;
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        Ok(())
    }

    fn queue_line(&mut self, line: &Line) -> Result<()> {
        let selected = line.spans.iter().any(|span| span.role == Role::Selected);
        let custom = match (&line.colors, selected) {
            (Some(metadata), false) => Some(metadata_colors(metadata)?),
            _ => None,
        };

        for span in &line.spans {
            let mut style = self.theme.style(span.role);
            if let Some((foreground, background)) = custom {
                if span.role == Role::Plain {
                    style.foreground = foreground.or(style.foreground);
                    style.background = background.or(style.background);
                }
            }

            self.queue_style(style).map_err(Error::Render)?;
            queue!(
                self.out,
                Print(&span.text),
                SetAttribute(Attribute::Reset),
                ResetColor
            )
            .map_err(Error::Render)?;
        }

        Ok(())
    }
}

impl<W: Write> Screen for CrosstermScreen<W> {
    fn size(&self) -> Result<Viewport> {
        let (width, height) = terminal::size().map_err(Error::Render)?;
        Ok(Viewport { width, height })
    }

    fn enter(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen, cursor::Hide).map_err(Error::Render)?;
        self.entered = true;
        enable_raw_mode().map_err(Error::Render)?;
        debug!("Entered alternate screen");
        Ok(())
    }

    fn next_event(&mut self) -> Result<Event> {
        loop {
            let term_event = event::read().map_err(Error::Render)?;
            if let Some(event) = input::translate(&term_event) {
                return Ok(event);
            }
        }
    }

    fn draw(&mut self, frame: &Frame) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0)).map_err(Error::Render)?;

        for line in &frame.lines {
            self.queue_line(line)?;
            queue!(self.out, MoveToNextLine(1)).map_err(Error::Render)?;
        }

        self.out.flush().map_err(Error::Render)
    }

    fn bell(&mut self) -> Result<()> {
        queue!(self.out, Print('\x07')).map_err(Error::Render)?;
        self.out.flush().map_err(Error::Render)
    }

    fn restore(&mut self) -> Result<()> {
        if !self.entered {
            return Ok(());
        }
        self.entered = false;

        disable_raw_mode().map_err(Error::Render)?;
        execute!(self.out, cursor::Show, LeaveAlternateScreen).map_err(Error::Render)?;
        debug!("Left alternate screen");
        Ok(())
    }
}

impl<W: Write> Drop for CrosstermScreen<W> {
    fn drop(&mut self) {
        if self.entered {
            let _ = disable_raw_mode();
            let _ = execute!(self.out, cursor::Show, LeaveAlternateScreen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_deck_core::command_definitions::{ColorDefinition, CommandMetadata};
    use command_deck_core::engine::Span;

    fn screen() -> CrosstermScreen<Vec<u8>> {
        CrosstermScreen::with_writer(Vec::new(), Theme::default())
    }

    fn output(screen: &CrosstermScreen<Vec<u8>>) -> String {
        String::from_utf8_lossy(screen.writer()).to_string()
    }

    #[test]
    fn test_draw_prints_every_span() {
        let mut screen = screen();
        let mut frame = Frame::default();
        frame.push(Line::styled("Title", Role::Title));
        frame.push(Line::new(vec![
            Span::new("▶ ", Role::Selected),
            Span::new("deploy", Role::Selected),
        ]));

        screen.draw(&frame).unwrap();
        let drawn = output(&screen);
        assert!(drawn.contains("Title"));
        assert!(drawn.contains("deploy"));
    }

    #[test]
    fn test_invalid_line_colors_fail_the_draw() {
        let mut screen = screen();
        let mut frame = Frame::default();
        frame.push(Line::new(vec![Span::plain("status")]).with_colors(Some(CommandMetadata {
            foreground_color: Some(ColorDefinition {
                rgb: None,
                ansi: None,
                name: Some("chartreuse".to_string()),
            }),
            background_color: None,
        })));

        assert!(matches!(
            screen.draw(&frame),
            Err(Error::UnknownColorName(_))
        ));
    }

    #[test]
    fn test_bell_and_restore_without_enter() {
        let mut screen = screen();
        screen.bell().unwrap();
        assert!(output(&screen).contains('\x07'));

        screen.restore().unwrap();
    }
}
