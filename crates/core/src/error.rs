use leon::{ParseError, RenderError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Command `{}` is reachable from itself; the catalog must be acyclic.", .name)]
    CyclicCatalog { name: String },

    #[error("Command definition references a node that does not exist: {}", .0)]
    DanglingReference(String),

    #[error("Invalid name: a command or parameter name may not be empty")]
    EmptyName,

    #[error("Invalid name `{}`: names may not contain whitespace", .0)]
    NameWithWhitespace(String),

    #[error("Found a non-unique command name under `{}`: `{}`", .0, .1)]
    NonUniqueCommandName(String, String),

    #[error("Found a non-unique parameter name on command `{}`: `{}`", .0, .1)]
    NonUniqueParameterName(String, String),

    #[error("Command `{}` uses placeholder `{}` but no parameter with that name is in scope", .0, .1)]
    NotFoundParameterName(String, String),

    #[error("Invalid pattern for parameter `{}`: {}", .name, .original)]
    InvalidPattern {
        name: String,
        original: regex::Error,
    },

    #[error("Default `{}` of parameter `{}` on command `{}` is invalid: {}", .value, .name, .command, .reason)]
    InvalidDefault {
        command: String,
        name: String,
        value: String,
        reason: String,
    },

    #[error("Rendering failed: {}", .0)]
    Render(#[source] std::io::Error),

    #[error("Invalid value for `{}`: {}", .name, .reason)]
    Validation { name: String, reason: String },

    #[error("Unknown parameter: `{}`", .0)]
    UnknownParameter(String),

    #[error("Parameter `{}` is not in the `name=value` format", .0)]
    ParameterFormat(String),

    #[error("No command found at path `{}`", .0)]
    CommandNotFound(String),

    #[error("The sub process exited with a non-success code.")]
    SubProcessExit,

    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("For a color, only one of `rgb`, `ansi` or `name` should be defined.")]
    MultipleColorTypes,

    #[error("Unknown color name: \"{}\"", _0)]
    UnknownColorName(String),

    #[error("Unknown theme: \"{}\"", _0)]
    UnknownTheme(String),

    #[error("Error parsing placeholder string: {}", .0)]
    TemplateParse(#[from] ParseError),

    #[error("Error rendering placeholder template string: {}", .0)]
    TemplateRender(#[from] RenderError),
}

impl Error {
    pub fn validation(name: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// Whether the error means the catalog itself is unusable.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CyclicCatalog { .. }
                | Self::DanglingReference(_)
                | Self::EmptyName
                | Self::NameWithWhitespace(_)
                | Self::NonUniqueCommandName(..)
                | Self::NonUniqueParameterName(..)
                | Self::NotFoundParameterName(..)
                | Self::InvalidPattern { .. }
                | Self::InvalidDefault { .. }
                | Self::MultipleColorTypes
                | Self::UnknownColorName(_)
        )
    }
}
