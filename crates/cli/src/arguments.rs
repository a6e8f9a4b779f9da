//! Parsing of `--param name=value` presets.

use indexmap::IndexMap;
use log::debug;

use command_deck_core::error::Error::ParameterFormat;
use command_deck_core::error::Result;

/// Parses one `name=value` pair. The value may itself contain `=`.
///
/// # Errors
///
/// Returns [`ParameterFormat`] if there is no `=` or the name is empty.
pub fn parse_named_parameter(parameter: &str) -> Result<(String, String)> {
    match parameter.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(ParameterFormat(parameter.to_string())),
    }
}

/// Parses every `--param` value into presets, in the order given.
///
/// A name given twice keeps the last value.
///
/// # Errors
///
/// Returns [`ParameterFormat`] for the first malformed pair.
pub fn parse_named_parameters(parameters: &[String]) -> Result<IndexMap<String, String>> {
    let mut presets = IndexMap::new();

    for parameter in parameters {
        let (name, value) = parse_named_parameter(parameter)?;
        if let Some(previous) = presets.insert(name.clone(), value) {
            debug!("Preset `{name}` given more than once, dropping `{previous}`");
        }
    }

    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_deck_core::error::Error;

    #[test]
    fn test_parse_named_parameter() {
        assert_eq!(
            parse_named_parameter("env=prod").unwrap(),
            ("env".to_string(), "prod".to_string())
        );
        assert_eq!(
            parse_named_parameter("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_named_parameter("message=").unwrap(),
            ("message".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_named_parameter_errors() {
        assert!(matches!(
            parse_named_parameter("no-equals"),
            Err(Error::ParameterFormat(p)) if p == "no-equals"
        ));
        assert!(matches!(
            parse_named_parameter("=value"),
            Err(Error::ParameterFormat(_))
        ));
    }
}
