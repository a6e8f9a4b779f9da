use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{CommandSource, SourceNode};
use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// Value type of a parameter, as declared in the catalog.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Bool,
    Int,
    Duration,
    Enum,
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParameterType::String => "string",
            ParameterType::Bool => "bool",
            ParameterType::Int => "int",
            ParameterType::Duration => "duration",
            ParameterType::Enum => "enum",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParameterOption {
    pub value: String,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl ParameterOption {
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

type ValidatorFn = dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync;

/// Host-supplied check run after the built-in type checks.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        (self.0)(value)
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validator(..)")
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ParameterDefinition {
    pub name: String,
    pub short: Option<String>,
    pub usage: Option<String>,
    pub default: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<ParameterOption>,
    pub pattern: Option<String>,
    #[serde(skip)]
    pub validator: Option<Validator>,
}

impl Display for ParameterDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "`{}`", self.name)?;

        if let Some(usage) = &self.usage {
            write!(formatter, " ({usage})")?;
        }

        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ColorDefinition {
    pub rgb: Option<(u8, u8, u8)>,
    pub ansi: Option<u8>,
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandMetadata {
    pub foreground_color: Option<ColorDefinition>,
    pub background_color: Option<ColorDefinition>,
}

/// Colour names a [`ColorDefinition`] may use, compared case-insensitively.
pub const COLOR_NAMES: [&str; 16] = [
    "black",
    "darkgrey",
    "red",
    "darkred",
    "green",
    "darkgreen",
    "yellow",
    "darkyellow",
    "blue",
    "darkblue",
    "magenta",
    "darkmagenta",
    "cyan",
    "darkcyan",
    "white",
    "grey",
];

impl ColorDefinition {
    /// # Errors
    ///
    /// Returns [`Error::MultipleColorTypes`] when more than one of `rgb`,
    /// `ansi` and `name` is set, and [`Error::UnknownColorName`] for a name
    /// outside [`COLOR_NAMES`].
    pub fn validate(&self) -> Result<()> {
        let defined_count = [self.rgb.is_some(), self.ansi.is_some(), self.name.is_some()]
            .iter()
            .filter(|&&x| x)
            .count();

        if defined_count > 1 {
            return Err(Error::MultipleColorTypes);
        }

        match &self.name {
            Some(name) if !COLOR_NAMES.contains(&name.to_lowercase().as_str()) => {
                Err(Error::UnknownColorName(name.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl CommandMetadata {
    /// # Errors
    ///
    /// Returns the first error of either colour definition.
    pub fn validate(&self) -> Result<()> {
        for color in [&self.foreground_color, &self.background_color]
            .into_iter()
            .flatten()
        {
            color.validate()?;
        }
        Ok(())
    }
}

fn default_available() -> bool {
    true
}

/// One command of a catalog file. Children are nested under `commands`.
#[derive(Deserialize, Debug, Clone)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(rename = "use")]
    pub usage: Option<String>,
    pub short: Option<String>,
    pub long: Option<String>,
    pub command: Option<Vec<String>>,
    pub runnable: Option<bool>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "default_available")]
    pub available: bool,
    pub metadata: Option<CommandMetadata>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
}

impl CommandDefinition {
    /// A command is runnable when it says so, or when it carries a command template.
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        self.runnable.unwrap_or(self.command.is_some())
    }

    /// Follows an index path (as recorded in a catalog node's origin) down the tree.
    #[must_use]
    pub fn resolve(&self, path: &[usize]) -> Option<&CommandDefinition> {
        let mut current = self;
        for index in path {
            current = current.commands.get(*index)?;
        }
        Some(current)
    }
}

impl Display for CommandDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.short {
            Some(short) => write!(formatter, "{} ({})", self.name, short),
            None => formatter.write_str(&self.name),
        }
    }
}

impl CommandSource for CommandDefinition {
    type Key = Vec<usize>;

    fn root(&self) -> Self::Key {
        Vec::new()
    }

    fn describe(&self, key: &Self::Key) -> Result<SourceNode> {
        let definition = self
            .resolve(key)
            .ok_or_else(|| Error::DanglingReference(format!("{key:?}")))?;

        Ok(SourceNode {
            name: definition.name.clone(),
            usage: definition
                .usage
                .clone()
                .unwrap_or_else(|| definition.name.clone()),
            short_description: definition.short.clone().unwrap_or_default(),
            long_description: definition.long.clone().unwrap_or_default(),
            runnable: definition.is_runnable(),
            hidden: definition.hidden,
            available: definition.available,
            parameters: definition.parameters.clone(),
            metadata: definition.metadata.clone(),
        })
    }

    fn children(&self, key: &Self::Key) -> Result<Vec<Self::Key>> {
        let definition = self
            .resolve(key)
            .ok_or_else(|| Error::DanglingReference(format!("{key:?}")))?;

        Ok((0..definition.commands.len())
            .map(|index| {
                let mut child = key.clone();
                child.push(index);
                child
            })
            .collect())
    }
}

/// Top level of a catalog file.
#[derive(Deserialize, Debug, Clone)]
pub struct CatalogFile {
    #[serde(default)]
    pub settings: SessionConfig,
    pub command: CommandDefinition,
}
