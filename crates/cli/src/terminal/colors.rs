use crossterm::style::Color;

use command_deck_core::command_definitions::{ColorDefinition, CommandMetadata};
use command_deck_core::config::ThemeName;
use command_deck_core::engine::Role;
use command_deck_core::error::{Error, Result};

/// Trait for converting color definitions to terminal colors
pub trait AsTermColor {
    fn as_crossterm_color(&self) -> Result<Option<Color>>;
}

impl AsTermColor for ColorDefinition {
    fn as_crossterm_color(&self) -> Result<Option<Color>> {
        self.validate()?;

        Ok(match (self.rgb, self.ansi, &self.name) {
            (Some((r, g, b)), _, _) => Some(Color::Rgb { r, g, b }),
            (_, Some(ansi), _) => Some(Color::AnsiValue(ansi)),
            (_, _, Some(name)) => Some(named_color(name)?),
            (None, None, None) => None,
        })
    }
}

fn named_color(name: &str) -> Result<Color> {
    Ok(match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "darkgrey" => Color::DarkGrey,
        "red" => Color::Red,
        "darkred" => Color::DarkRed,
        "green" => Color::Green,
        "darkgreen" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "darkyellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "darkblue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "darkmagenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "darkcyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" => Color::Grey,
        _ => return Err(Error::UnknownColorName(name.to_string())),
    })
}

fn color_from_metadata_attribute(
    color_definition: Option<&ColorDefinition>,
) -> Result<Option<Color>> {
    match color_definition {
        None => Ok(None),
        Some(color_definition) => color_definition.as_crossterm_color(),
    }
}

/// Custom foreground and background of a catalog entry.
///
/// # Errors
///
/// Fails if either colour definition is invalid.
pub fn metadata_colors(metadata: &CommandMetadata) -> Result<(Option<Color>, Option<Color>)> {
    Ok((
        color_from_metadata_attribute(metadata.foreground_color.as_ref())?,
        color_from_metadata_attribute(metadata.background_color.as_ref())?,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
}

impl Style {
    fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            background: None,
            bold: false,
        }
    }

    fn on(foreground: Color, background: Color) -> Self {
        Self {
            foreground: Some(foreground),
            background: Some(background),
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Maps each [`Role`] to a terminal style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    title: Style,
    header: Style,
    selected: Style,
    disabled: Style,
    highlight: Style,
    help: Style,
    error: Style,
    success: Style,
    muted: Style,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

impl Theme {
    #[must_use]
    pub fn new(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self {
                title: Style::fg(Color::Cyan).bold(),
                header: Style::on(Color::White, Color::DarkBlue),
                selected: Style::on(Color::Black, Color::DarkGreen),
                disabled: Style::fg(Color::DarkGrey),
                highlight: Style::fg(Color::Yellow).bold(),
                help: Style::fg(Color::DarkGrey),
                error: Style::fg(Color::Red).bold(),
                success: Style::fg(Color::Green),
                muted: Style::fg(Color::Grey),
            },
            ThemeName::Dark => Self {
                title: Style::fg(Color::White).bold(),
                header: Style::on(Color::Grey, Color::Black),
                selected: Style::on(Color::White, Color::DarkGrey),
                disabled: Style::fg(Color::DarkGrey),
                highlight: Style::fg(Color::DarkYellow).bold(),
                help: Style::fg(Color::DarkGrey),
                error: Style::fg(Color::DarkRed).bold(),
                success: Style::fg(Color::DarkGreen),
                muted: Style::fg(Color::DarkGrey),
            },
            ThemeName::Light => Self {
                title: Style::fg(Color::DarkBlue).bold(),
                header: Style::on(Color::Black, Color::Grey),
                selected: Style::on(Color::White, Color::DarkBlue),
                disabled: Style::fg(Color::Grey),
                highlight: Style::fg(Color::DarkMagenta).bold(),
                help: Style::fg(Color::DarkGrey),
                error: Style::fg(Color::DarkRed).bold(),
                success: Style::fg(Color::DarkGreen),
                muted: Style::fg(Color::DarkGrey),
            },
            ThemeName::Minimal => Self {
                title: Style::default().bold(),
                header: Style::default(),
                selected: Style::default().bold(),
                disabled: Style::default(),
                highlight: Style::default().bold(),
                help: Style::default(),
                error: Style::default().bold(),
                success: Style::default(),
                muted: Style::default(),
            },
            ThemeName::Dracula => Self {
                title: Style::fg(rgb(189, 147, 249)).bold(),
                header: Style::on(rgb(248, 248, 242), rgb(68, 71, 90)),
                selected: Style::on(rgb(40, 42, 54), rgb(80, 250, 123)),
                disabled: Style::fg(rgb(98, 114, 164)),
                highlight: Style::fg(rgb(255, 121, 198)).bold(),
                help: Style::fg(rgb(98, 114, 164)),
                error: Style::fg(rgb(255, 85, 85)).bold(),
                success: Style::fg(rgb(80, 250, 123)),
                muted: Style::fg(rgb(139, 233, 253)),
            },
            ThemeName::Nord => Self {
                title: Style::fg(rgb(136, 192, 208)).bold(),
                header: Style::on(rgb(236, 239, 244), rgb(59, 66, 82)),
                selected: Style::on(rgb(46, 52, 64), rgb(129, 161, 193)),
                disabled: Style::fg(rgb(76, 86, 106)),
                highlight: Style::fg(rgb(235, 203, 139)).bold(),
                help: Style::fg(rgb(76, 86, 106)),
                error: Style::fg(rgb(191, 97, 106)).bold(),
                success: Style::fg(rgb(163, 190, 140)),
                muted: Style::fg(rgb(216, 222, 233)),
            },
            ThemeName::Monokai => Self {
                title: Style::fg(rgb(102, 217, 239)).bold(),
                header: Style::on(rgb(248, 248, 242), rgb(73, 72, 62)),
                selected: Style::on(rgb(39, 40, 34), rgb(166, 226, 46)),
                disabled: Style::fg(rgb(117, 113, 94)),
                highlight: Style::fg(rgb(230, 219, 116)).bold(),
                help: Style::fg(rgb(117, 113, 94)),
                error: Style::fg(rgb(249, 38, 114)).bold(),
                success: Style::fg(rgb(166, 226, 46)),
                muted: Style::fg(rgb(253, 151, 31)),
            },
        }
    }

    #[must_use]
    pub fn style(&self, role: Role) -> Style {
        match role {
            Role::Plain => Style::default(),
            Role::Title => self.title,
            Role::Header => self.header,
            Role::Selected => self.selected,
            Role::Disabled => self.disabled,
            Role::Highlight => self.highlight,
            Role::Help => self.help,
            Role::Error => self.error,
            Role::Success => self.success,
            Role::Muted => self.muted,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Default)
    }
}
