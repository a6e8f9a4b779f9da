//! Command Deck CLI Library
//!
//! The terminal host for `command_deck_core`: it parses flags, loads the
//! catalog file, runs a session on a crossterm screen and executes whatever
//! the operator confirmed.
//!
//! - [`cli_args`]: Command-line argument parsing and overrides of the catalog settings
//! - [`arguments`]: `--param name=value` presets
//! - [`terminal`]: The crossterm-backed screen, key translation and themes
//! - [`display`]: Catalog listings for `--tree` and `--list`
//! - [`execution`]: Resolving and running the chosen command
//!
//! # Examples
//!
//! ```bash
//! # Browse the catalog level by level
//! deck
//!
//! # Start at a group, or go straight to a command's form
//! deck db
//! deck db backup -p env=prod
//!
//! # Search every runnable command at once
//! deck --flat --fuzzy
//!
//! # Show what would run without running it
//! deck --dry-run db backup
//! ```

pub mod arguments;
pub mod cli_args;
pub mod display;
pub mod execution;
pub mod terminal;
