use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use command_deck_core::engine::{Event, Key};

/// Maps a terminal event to an engine event.
///
/// Key releases and keys the engine has no use for map to `None`.
#[must_use]
pub fn translate(event: &TermEvent) -> Option<Event> {
    match event {
        TermEvent::Key(key_event) => translate_key(key_event).map(Event::Key),
        TermEvent::Resize(width, height) => Some(Event::Resize(*width, *height)),
        _ => None,
    }
}

fn translate_key(key_event: &KeyEvent) -> Option<Key> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }

    let key = match key_event.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab if key_event.modifiers.contains(KeyModifiers::SHIFT) => Key::BackTab,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Char(c) if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            Key::Ctrl(c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };

    Some(key)
}
