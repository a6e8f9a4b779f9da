//! Command Deck Core Library
//!
//! This crate provides the interaction engine behind command-deck: browse or
//! search a hierarchical catalog of commands, pick one, fill in its
//! parameters and confirm before the host runs it.
//!
//! # Key Features
//!
//! - **Catalog**: Mirror any command tree into a read-only arena of nodes
//! - **Search**: Substring or fuzzy filtering that never reorders entries
//! - **Parameters**: Typed, validated parameters inherited through scopes
//! - **State Machines**: Menu, form and confirmation models driven by one render loop
//! - **Sessions**: Sequence every stage and hand back a [`session::SessionResult`]
//!
//! The engine does no terminal I/O itself. Hosts implement
//! [`engine::Screen`] (or the higher level [`session::Renderer`]).
//!
//! # Examples
//!
//! Loading a catalog and listing its runnable commands:
//!
//! ```no_run
//! use command_deck_core::catalog::Catalog;
//! use command_deck_core::file_handling::get_catalog_definition;
//!
//! let catalog_file = get_catalog_definition("catalog.yml")?;
//! let catalog = Catalog::build(&catalog_file.command)?;
//! for entry in catalog.flatten() {
//!     println!("{}: {}", entry.display_path, entry.short_description);
//! }
//! # Ok::<(), command_deck_core::error::Error>(())
//! ```

pub mod catalog;
pub mod command_definitions;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod file_handling;
pub mod form;
pub mod interpolation;
pub mod menu;
pub mod navigator;
pub mod parameters;
pub mod search;
pub mod session;
