//! Parameter specs, validation and scope-aware collection.
//!
//! Parameters are declared on catalog nodes. A command sees its own parameters
//! plus those of every ancestor; when two scopes declare the same name the one
//! closest to the command wins.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use indexmap::IndexMap;
use log::debug;
use regex::Regex;

use crate::catalog::{Catalog, NodeId};
use crate::command_definitions::{ParameterDefinition, ParameterOption, ParameterType, Validator};
use crate::error::{Error, Result};

/// Names owned by the engine itself; catalogs cannot expose them in a form.
const RESERVED_NAMES: [&str; 2] = ["help", "tui"];
const RESERVED_PREFIX: &str = "tui-";

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name) || name.starts_with(RESERVED_PREFIX)
}

/// A parameter as the form and the controller see it.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub short_name: Option<String>,
    pub description: String,
    pub default_value: String,
    pub current_value: String,
    pub required: bool,
    pub kind: ParameterType,
    /// Name of the catalog node that declared the parameter.
    pub source_scope: String,
    pub options: Vec<ParameterOption>,
    pub validator: Option<Validator>,
    pattern: Option<Regex>,
}

fn fallback_default(kind: ParameterType) -> &'static str {
    match kind {
        ParameterType::Bool => "false",
        ParameterType::Int => "0",
        ParameterType::Duration => "0s",
        ParameterType::String | ParameterType::Enum => "",
    }
}

impl ParameterSpec {
    pub fn new(name: &str, kind: ParameterType) -> Self {
        let default_value = fallback_default(kind).to_string();
        Self {
            name: name.to_string(),
            short_name: None,
            description: String::new(),
            current_value: default_value.clone(),
            default_value,
            required: false,
            kind,
            source_scope: String::new(),
            options: Vec::new(),
            validator: None,
            pattern: None,
        }
    }

    /// Builds the spec for a parameter declared on the node called `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] for an unnamed parameter,
    /// [`Error::InvalidPattern`] when `pattern` does not compile and
    /// [`Error::InvalidDefault`] when `default` is not a valid value.
    pub fn from_definition(definition: &ParameterDefinition, scope: &str) -> Result<Self> {
        if definition.name.is_empty() {
            return Err(Error::EmptyName);
        }

        let mut spec = Self::new(&definition.name, definition.kind);
        spec.short_name.clone_from(&definition.short);
        spec.description = definition.usage.clone().unwrap_or_default();
        spec.required = definition.required;
        spec.source_scope = scope.to_string();
        spec.options.clone_from(&definition.options);
        spec.validator.clone_from(&definition.validator);

        if let Some(default) = &definition.default {
            spec = spec.with_default(default);
        }

        if let Some(pattern) = &definition.pattern {
            spec = spec.with_pattern(pattern)?;
        }

        if definition.default.is_some() {
            spec.validate(&spec.default_value).map_err(|e| match e {
                Error::Validation { name, reason } => Error::InvalidDefault {
                    command: scope.to_string(),
                    name,
                    value: spec.default_value.clone(),
                    reason,
                },
                other => other,
            })?;
        }

        Ok(spec)
    }

    #[must_use]
    pub fn with_default(mut self, default: &str) -> Self {
        self.default_value = default.to_string();
        self.current_value = default.to_string();
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.source_scope = scope.to_string();
        self
    }

    #[must_use]
    pub fn with_options(mut self, values: &[&str]) -> Self {
        self.options = values
            .iter()
            .map(|value| ParameterOption {
                value: (*value).to_string(),
                label: None,
                description: None,
            })
            .collect();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when `pattern` is not a valid regular expression.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|original| Error::InvalidPattern {
            name: self.name.clone(),
            original,
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    /// Checks `value` against every constraint of the parameter.
    ///
    /// The checks run in order: required, type, enum options, pattern and
    /// finally the host validator. The first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first failed check.
    pub fn validate(&self, value: &str) -> Result<()> {
        self.parse(value).map(|_| ())
    }

    /// Validates `value` and converts it to its typed form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the value is rejected.
    pub fn parse(&self, value: &str) -> Result<TypedValue> {
        if value.is_empty() {
            if self.required {
                return Err(Error::validation(&self.name, "a value is required"));
            }
            match self.kind {
                ParameterType::String => return Ok(TypedValue::Text(String::new())),
                ParameterType::Enum => return Ok(TypedValue::Choice(String::new())),
                _ => {}
            }
        }

        let typed = match self.kind {
            ParameterType::String => TypedValue::Text(value.to_string()),
            ParameterType::Bool => match value {
                "true" => TypedValue::Bool(true),
                "false" => TypedValue::Bool(false),
                _ => {
                    return Err(Error::validation(
                        &self.name,
                        format!("expected `true` or `false`, got {value:?}"),
                    ))
                }
            },
            ParameterType::Int => value.parse::<i64>().map(TypedValue::Int).map_err(|_| {
                Error::validation(&self.name, format!("expected an integer, got {value:?}"))
            })?,
            ParameterType::Duration => parse_duration(value)
                .map(TypedValue::Duration)
                .map_err(|reason| Error::validation(&self.name, reason))?,
            ParameterType::Enum => {
                if !self.options.is_empty() && !self.options.iter().any(|o| o.value == value) {
                    let allowed: Vec<&str> = self.options.iter().map(|o| o.value.as_str()).collect();
                    return Err(Error::validation(
                        &self.name,
                        format!("must be one of: {}", allowed.join(", ")),
                    ));
                }
                TypedValue::Choice(value.to_string())
            }
        };

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(Error::validation(
                    &self.name,
                    format!("does not match pattern `{}`", pattern.as_str()),
                ));
            }
        }

        if let Some(validator) = &self.validator {
            validator
                .check(value)
                .map_err(|reason| Error::validation(&self.name, reason))?;
        }

        Ok(typed)
    }

    /// Next value for a bool flip or enum cycle, `None` for other types.
    #[must_use]
    pub fn step(&self, value: &str, forward: bool) -> Option<String> {
        match self.kind {
            ParameterType::Bool => {
                let flipped = if value == "true" { "false" } else { "true" };
                Some(flipped.to_string())
            }
            ParameterType::Enum if !self.options.is_empty() => {
                let count = self.options.len();
                let next = match self.options.iter().position(|o| o.value == value) {
                    Some(index) if forward => (index + 1) % count,
                    Some(index) => (index + count - 1) % count,
                    None => 0,
                };
                Some(self.options[next].value.clone())
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_toggle(&self) -> bool {
        matches!(self.kind, ParameterType::Bool)
            || (self.kind == ParameterType::Enum && !self.options.is_empty())
    }
}

impl Display for ParameterSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "--{}", self.name)?;
        if let Some(short) = &self.short_name {
            write!(f, ", -{short}")?;
        }
        write!(f, " ({})", self.kind)
    }
}

/// A validated parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Duration(Duration),
    Choice(String),
}

/// Parses a duration such as `90s`, `1h30m`, `250ms` or `1.5h`.
///
/// A bare `0` is accepted. Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
///
/// # Errors
///
/// Returns a human-readable reason when the text is not a duration.
pub fn parse_duration(raw: &str) -> std::result::Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("expected a duration such as `30s` or `1h30m`".to_string());
    }
    if value.starts_with('-') {
        return Err("durations must not be negative".to_string());
    }
    let value = value.strip_prefix('+').unwrap_or(value);
    if value == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos = 0f64;
    let mut rest = value;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let number: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration {raw:?}"))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let nanos_per_unit = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in duration {raw:?}")),
            other => return Err(format!("unknown unit `{other}` in duration {raw:?}")),
        };

        total_nanos += (number * nanos_per_unit).round();
        rest = tail;
    }

    if total_nanos >= u64::MAX as f64 {
        return Err(format!("duration {raw:?} is out of range"));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Duration::from_nanos(total_nanos as u64))
}

/// Parameters visible from `node`, closest scope first.
///
/// Walks from `node` toward the root. Each scope contributes its parameters
/// in declaration order; a name already seen closer to `node` and any
/// reserved name are skipped.
#[must_use]
pub fn collect(catalog: &Catalog, node: NodeId) -> Vec<ParameterSpec> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut collected = Vec::new();

    for scope in catalog.ancestors(node) {
        for spec in &catalog.node(scope).parameters {
            if is_reserved(&spec.name) || !seen.insert(spec.name.as_str()) {
                continue;
            }
            collected.push(spec.clone());
        }
    }

    debug!(
        "Collected {} parameter(s) for `{}`",
        collected.len(),
        catalog.display_path(node)
    );

    collected
}

/// A value bound to the parameter definition it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub scope: NodeId,
    pub value: TypedValue,
}

/// Result of [`apply`]: the values that bound, plus the first failure.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub bindings: IndexMap<String, Binding>,
    pub error: Option<Error>,
}

impl ApplyOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Binds `values` to the parameter definitions visible from `node`.
///
/// Each name resolves to the first definition found walking toward the root.
/// Application is best effort: a rejected or unknown name is skipped, the
/// first such error is kept, and the remaining names are still applied.
#[must_use]
pub fn apply(catalog: &Catalog, node: NodeId, values: &IndexMap<String, String>) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    for (name, value) in values {
        let found = catalog.ancestors(node).into_iter().find_map(|scope| {
            catalog
                .node(scope)
                .parameters
                .iter()
                .find(|spec| &spec.name == name && !is_reserved(&spec.name))
                .map(|spec| (scope, spec))
        });

        let result = match found {
            Some((scope, spec)) => spec.parse(value).map(|value| Binding { scope, value }),
            None => Err(Error::UnknownParameter(name.clone())),
        };

        match result {
            Ok(binding) => {
                outcome.bindings.insert(name.clone(), binding);
            }
            Err(e) => {
                if outcome.error.is_none() {
                    outcome.error = Some(e);
                }
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_defaults() {
        assert_eq!(ParameterSpec::new("v", ParameterType::Bool).current_value, "false");
        assert_eq!(ParameterSpec::new("n", ParameterType::Int).default_value, "0");
        assert_eq!(ParameterSpec::new("t", ParameterType::Duration).default_value, "0s");
        assert_eq!(ParameterSpec::new("s", ParameterType::String).default_value, "");
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved("help"));
        assert!(is_reserved("tui"));
        assert!(is_reserved("tui-theme"));
        assert!(!is_reserved("tuition"));
        assert!(!is_reserved("host"));
    }

    #[test]
    fn test_required_value() {
        let spec = ParameterSpec::new("host", ParameterType::String).required();
        assert!(matches!(spec.validate(""), Err(Error::Validation { .. })));
        assert!(spec.validate("example.org").is_ok());

        let optional = ParameterSpec::new("host", ParameterType::String);
        assert!(optional.validate("").is_ok());
    }

    #[test]
    fn test_type_checks() {
        let flag = ParameterSpec::new("verbose", ParameterType::Bool);
        assert_eq!(flag.parse("true").unwrap(), TypedValue::Bool(true));
        assert!(flag.validate("yes").is_err());
        assert!(flag.validate("").is_err());

        let count = ParameterSpec::new("count", ParameterType::Int);
        assert_eq!(count.parse("-42").unwrap(), TypedValue::Int(-42));
        assert!(count.validate("4.2").is_err());

        let timeout = ParameterSpec::new("timeout", ParameterType::Duration);
        assert_eq!(
            timeout.parse("1m30s").unwrap(),
            TypedValue::Duration(Duration::from_secs(90))
        );
        assert!(timeout.validate("soon").is_err());
    }

    #[test]
    fn test_enum_options() {
        let level = ParameterSpec::new("level", ParameterType::Enum)
            .with_options(&["info", "debug"])
            .with_default("info");
        assert!(level.validate("debug").is_ok());
        assert!(level.validate("trace").is_err());
        assert!(level.validate("").is_ok());
    }

    #[test]
    fn test_pattern_and_validator() {
        let port = ParameterSpec::new("port", ParameterType::String)
            .with_pattern(r"^\d+$")
            .unwrap()
            .with_validator(Validator::new(|value| {
                if value.len() > 5 {
                    Err("too long".to_string())
                } else {
                    Ok(())
                }
            }));

        assert!(port.validate("8080").is_ok());
        assert!(port.validate("eighty").is_err());
        match port.validate("123456") {
            Err(Error::Validation { reason, .. }) => assert_eq!(reason, "too long"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let result = ParameterSpec::new("bad", ParameterType::String).with_pattern("(");
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_definition_default_must_fit() {
        let definition = ParameterDefinition {
            name: "level".to_string(),
            kind: ParameterType::Enum,
            default: Some("loud".to_string()),
            options: ["info", "debug"]
                .iter()
                .map(|value| ParameterOption {
                    value: (*value).to_string(),
                    label: None,
                    description: None,
                })
                .collect(),
            ..ParameterDefinition::default()
        };
        match ParameterSpec::from_definition(&definition, "deploy") {
            Err(Error::InvalidDefault {
                command,
                name,
                value,
                ..
            }) => assert_eq!((command.as_str(), name.as_str(), value.as_str()), ("deploy", "level", "loud")),
            other => panic!("unexpected result: {other:?}"),
        }

        let fitting = ParameterDefinition {
            default: Some("debug".to_string()),
            ..definition
        };
        assert_eq!(
            ParameterSpec::from_definition(&fitting, "deploy").unwrap().current_value,
            "debug"
        );
    }

    #[test]
    fn test_step_bool_and_enum() {
        let flag = ParameterSpec::new("verbose", ParameterType::Bool);
        assert_eq!(flag.step("false", true).as_deref(), Some("true"));
        assert_eq!(flag.step("true", false).as_deref(), Some("false"));

        let level = ParameterSpec::new("level", ParameterType::Enum).with_options(&["a", "b", "c"]);
        assert_eq!(level.step("c", true).as_deref(), Some("a"));
        assert_eq!(level.step("a", false).as_deref(), Some("c"));
        assert_eq!(level.step("", true).as_deref(), Some("a"));

        let name = ParameterSpec::new("name", ParameterType::String);
        assert_eq!(name.step("x", true), None);
        assert!(!name.is_toggle());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("3 days").is_err());
    }

    #[test]
    fn test_display() {
        let mut spec = ParameterSpec::new("verbose", ParameterType::Bool);
        spec.short_name = Some("v".to_string());
        assert_eq!(spec.to_string(), "--verbose, -v (bool)");
    }
}
