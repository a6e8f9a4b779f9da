//! Session configuration and path utilities.
//!
//! [`SessionConfig`] is the one record that shapes a session. It is built once,
//! either from the `settings:` section of a catalog file or in code, and handed
//! to the controller; nothing reads configuration from global state.

use serde::Deserialize;

/// Default path for the catalog file
const DEFAULT_CATALOG_PATH: &str = "~/.command-deck/catalog.yml";

/// Default shell to use for command execution
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// How the navigator presents the catalog.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// One menu per level, descending into groups.
    #[default]
    Tree,
    /// A single list of every runnable command with its full path.
    Flat,
}

/// How search queries are matched against menu entries.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring match.
    #[default]
    Substring,
    /// Subsequence ("fuzzy") match.
    Fuzzy,
}

/// Named colour palette. Interpreting it is up to the screen implementation.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Default,
    Dark,
    Light,
    Minimal,
    Dracula,
    Nord,
    Monokai,
}

impl ThemeName {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            "minimal" => Some(Self::Minimal),
            "dracula" => Some(Self::Dracula),
            "nord" => Some(Self::Nord),
            "monokai" => Some(Self::Monokai),
            _ => None,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Settings for one interactive session.
///
/// | field                       | default     |
/// |-----------------------------|-------------|
/// | `navigation`                | `tree`      |
/// | `match_mode`                | `substring` |
/// | `show_description`          | `true`      |
/// | `show_parameters`           | `true`      |
/// | `confirm_before_execute`    | `true`      |
/// | `group_parameters_by_scope` | `false`     |
/// | `theme`                     | `default`   |
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default)]
    pub navigation: NavigationMode,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Show the description of the highlighted menu entry.
    #[serde(default = "enabled")]
    pub show_description: bool,
    /// Open the parameter form after a command is chosen.
    #[serde(default = "enabled")]
    pub show_parameters: bool,
    /// Ask for confirmation before handing the result to the executor.
    #[serde(default = "enabled")]
    pub confirm_before_execute: bool,
    #[serde(default)]
    pub group_parameters_by_scope: bool,
    #[serde(default)]
    pub theme: ThemeName,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            navigation: NavigationMode::Tree,
            match_mode: MatchMode::Substring,
            show_description: true,
            show_parameters: true,
            confirm_before_execute: true,
            group_parameters_by_scope: false,
            theme: ThemeName::Default,
        }
    }
}

/// Resolves the catalog file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// catalog path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use command_deck_core::config::get_catalog_path;
///
/// let default_path = get_catalog_path(&None);
/// assert!(default_path.ends_with("catalog.yml"));
///
/// let custom_path = get_catalog_path(&Some("/path/to/catalog.yml".to_string()));
/// assert_eq!(custom_path, "/path/to/catalog.yml");
/// ```
pub fn get_catalog_path(catalog_path_arg: &Option<String>) -> String {
    let catalog_path = match catalog_path_arg {
        Some(catalog_path) => catalog_path,
        None => DEFAULT_CATALOG_PATH,
    };

    shellexpand::tilde(catalog_path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_catalog_path_with_custom_path() {
        let custom_path = Some("/custom/path/catalog.yml".to_string());
        let result = get_catalog_path(&custom_path);
        assert_eq!(result, "/custom/path/catalog.yml");
    }

    #[test]
    fn test_get_catalog_path_with_none() {
        let result = get_catalog_path(&None);
        assert!(result.contains("catalog.yml"));
        assert!(!result.starts_with('~'));
    }

    #[test]
    fn test_get_catalog_path_with_tilde() {
        let tilde_path = Some("~/my-catalog.yml".to_string());
        let result = get_catalog_path(&tilde_path);
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("my-catalog.yml"));
    }

    #[test]
    fn test_defaults_match_empty_settings() {
        let parsed: SessionConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(parsed, SessionConfig::default());
    }

    #[test]
    fn test_partial_settings() {
        let yaml = "navigation: flat\nconfirm_before_execute: false\ntheme: nord\n";
        let parsed: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.navigation, NavigationMode::Flat);
        assert!(!parsed.confirm_before_execute);
        assert!(parsed.show_parameters);
        assert_eq!(parsed.theme, ThemeName::Nord);
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(ThemeName::from_name("Dracula"), Some(ThemeName::Dracula));
        assert_eq!(ThemeName::from_name("solarized"), None);
    }

    #[test]
    fn test_default_shell_constant() {
        assert_eq!(DEFAULT_SHELL, "/bin/bash");
    }
}
