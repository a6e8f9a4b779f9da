//! Command-line argument parsing.
//!
//! Flags given here override the `settings:` section of the catalog file.

use clap::Parser;

use command_deck_core::config::{MatchMode, NavigationMode, SessionConfig, ThemeName};
use command_deck_core::error::{Error, Result};

/// Command-line arguments for the `deck` binary.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use command_deck_cli::cli_args::Args;
///
/// let args = Args::parse_from(["deck", "--flat", "db", "backup"]);
/// assert_eq!(args.command_path, vec!["db", "backup"]);
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
#[allow(clippy::struct_excessive_bools)] // silence clippy's warning on this struct
pub struct Args {
    /// Path to the catalog YAML file.
    ///
    /// If not provided, defaults to `~/.command-deck/catalog.yml`.
    #[arg(long, short = 'c')]
    pub catalog_path: Option<String>,

    /// Print the command that would run, but do not execute it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,

    /// Run the command without asking for confirmation first.
    #[arg(long, short = 'f', action)]
    pub force: bool,

    /// Browse every runnable command in one list instead of level by level.
    #[arg(long, action)]
    pub flat: bool,

    /// Match the search query as a fuzzy subsequence.
    #[arg(long, action)]
    pub fuzzy: bool,

    /// Skip the parameter form and use defaults and `--param` values.
    #[arg(long, action)]
    pub no_form: bool,

    /// Colour theme: default, dark, light, minimal, dracula, nord or monokai.
    #[arg(long)]
    pub theme: Option<String>,

    /// Parameter values in the format name=value.
    ///
    /// Multiple parameters can be provided with repeated `-p` flags.
    ///
    /// # Examples
    /// ```bash
    /// deck db backup -p env=prod -p timeout=5m
    /// ```
    #[arg(long = "param", short = 'p', action = clap::ArgAction::Append)]
    pub parameters: Vec<String>,

    /// Print the catalog as a tree and exit.
    #[arg(long, action, conflicts_with = "list")]
    pub tree: bool,

    /// Print every runnable command as a numbered list and exit.
    #[arg(long, action)]
    pub list: bool,

    /// Names of the commands leading to where the session should start.
    pub command_path: Vec<String>,
}

impl Args {
    /// Applies the flags on top of the settings read from the catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if `--theme` names an unknown theme.
    pub fn apply_to(&self, mut config: SessionConfig) -> Result<SessionConfig> {
        if self.flat {
            config.navigation = NavigationMode::Flat;
        }

        if self.fuzzy {
            config.match_mode = MatchMode::Fuzzy;
        }

        if self.no_form {
            config.show_parameters = false;
        }

        if self.force {
            config.confirm_before_execute = false;
        }

        if let Some(theme) = &self.theme {
            config.theme =
                ThemeName::from_name(theme).ok_or_else(|| Error::UnknownTheme(theme.clone()))?;
        }

        Ok(config)
    }

    /// Whether the catalog should only be printed.
    #[must_use]
    pub fn is_listing(&self) -> bool {
        self.tree || self.list
    }
}
