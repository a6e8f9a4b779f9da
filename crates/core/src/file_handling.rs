//! Loading and validation of catalog files.
//!
//! A catalog file holds optional session `settings` and the root `command`.
//! Loading checks what the YAML schema cannot: name format, uniqueness of
//! parameter names per command, defaults and patterns that fit their
//! parameter, colour definitions, and that template placeholders name a
//! parameter in scope.

use std::collections::HashSet;
use std::fs::File;

use log::debug;

use crate::command_definitions::{CatalogFile, CommandDefinition};
use crate::error::Error::{
    EmptyName, NameWithWhitespace, NonUniqueParameterName, NotFoundParameterName,
};
use crate::error::{Error, Result};
use crate::interpolation::{get_templates, get_tokens};
use crate::parameters::ParameterSpec;

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    match File::open(path) {
        Ok(reader) => Ok(reader),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(EmptyName);
    }

    if name.chars().any(char::is_whitespace) {
        return Err(NameWithWhitespace(name.to_string()));
    }

    Ok(())
}

/// Checks `command` and its subtree. `in_scope` holds the parameter names
/// declared by the ancestors of `command`.
fn validate_command(command: &CommandDefinition, in_scope: &HashSet<String>) -> Result<()> {
    validate_name(&command.name)?;

    if let Some(metadata) = &command.metadata {
        metadata.validate()?;
    }

    let mut names = HashSet::new();
    for parameter in &command.parameters {
        validate_name(&parameter.name)?;
        ParameterSpec::from_definition(parameter, &command.name)?;

        if !names.insert(parameter.name.clone()) {
            return Err(NonUniqueParameterName(
                format!("{command}"),
                parameter.name.clone(),
            ));
        }
    }

    let mut visible = in_scope.clone();
    visible.extend(names);

    if let Some(template) = &command.command {
        let templates = get_templates(template)?;
        for token in get_tokens(&templates) {
            if !visible.contains(&token) {
                return Err(NotFoundParameterName(format!("{command}"), token));
            }
        }
    }

    for child in &command.commands {
        validate_command(child, &visible)?;
    }

    Ok(())
}

/// Loads and validates a catalog file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is malformed or doesn't match the expected structure
/// - A command or parameter name is empty or contains whitespace
/// - A command declares the same parameter twice
/// - A parameter default does not fit its type, options or pattern
/// - A colour definition is ambiguous or names an unknown colour
/// - A command template uses a placeholder with no parameter in scope
///
/// # Examples
///
/// ```no_run
/// use command_deck_core::file_handling::get_catalog_definition;
///
/// let catalog_file = get_catalog_definition("/etc/command-deck/catalog.yml")?;
/// println!("Root command: {}", catalog_file.command);
/// # Ok::<(), command_deck_core::error::Error>(())
/// ```
pub fn get_catalog_definition(path: &str) -> Result<CatalogFile> {
    let reader = get_reader("catalog", path)?;

    let catalog_file: CatalogFile = serde_yaml::from_reader(reader).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "catalog".to_string(),
            path.to_string(),
            e,
        )
    })?;

    validate_command(&catalog_file.command, &HashSet::new())?;
    debug!("Loaded catalog `{}` from {path}", catalog_file.command.name);

    Ok(catalog_file)
}
