use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use leon::Template;

use crate::error::Result;

/// Find all tokens in all arguments of templates of command.
pub fn get_tokens(templates: &[Template]) -> HashSet<String> {
    let mut tokens = HashSet::new();

    for template in templates {
        for key in template.keys() {
            let _ = tokens.insert((*key).to_string());
        }
    }

    tokens
}

pub fn get_templates(command: &[String]) -> Result<Vec<Template<'_>>> {
    let mut templates = Vec::with_capacity(command.len());

    for argument in command {
        templates.push(Template::parse(argument.as_ref())?);
    }

    Ok(templates)
}

pub fn interpolate_command(
    values: &IndexMap<String, String>,
    templates: &[Template],
) -> Result<Vec<String>> {
    let context: HashMap<String, String> = values
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let mut interpolated_arguments: Vec<String> = Vec::new();

    for template in templates {
        interpolated_arguments.push(template.render(&context)?);
    }

    Ok(interpolated_arguments)
}

/// Renders every argument of a command template with `values`.
///
/// # Errors
///
/// Fails when an argument is not a valid template or names a value that is
/// not in `values`.
pub fn render_command(
    command: &[String],
    values: &IndexMap<String, String>,
) -> Result<Vec<String>> {
    let templates = get_templates(command)?;
    interpolate_command(values, &templates)
}
