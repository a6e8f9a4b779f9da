use std::env;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use command_deck_cli::arguments::parse_named_parameters;
use command_deck_cli::cli_args::Args;
use command_deck_cli::display::{format_list, format_tree};
use command_deck_cli::execution;
use command_deck_cli::terminal::colors::Theme;
use command_deck_cli::terminal::CrosstermScreen;
use command_deck_core::catalog::Catalog;
use command_deck_core::config::{self, DEFAULT_SHELL};
use command_deck_core::error::Error::CommandNotFound;
use command_deck_core::error::Result;
use command_deck_core::file_handling;
use command_deck_core::session::{LoopRenderer, Session};

fn execute() -> Result<()> {
    let args = Args::parse();

    let catalog_path = config::get_catalog_path(&args.catalog_path);
    debug!("Catalog path: `{catalog_path}`");

    let catalog_file = file_handling::get_catalog_definition(&catalog_path)?;
    let catalog = Catalog::build(&catalog_file.command)?;

    if args.is_listing() {
        let listing = if args.tree {
            format_tree(&catalog)
        } else {
            format_list(&catalog)
        };
        println!("{listing}");
        return Ok(());
    }

    let config = args.apply_to(catalog_file.settings.clone())?;
    let presets = parse_named_parameters(&args.parameters)?;

    let mut session = Session::new(&catalog, config.clone()).with_presets(presets);
    if !args.command_path.is_empty() {
        let start = catalog
            .find_by_path(&args.command_path)
            .ok_or_else(|| CommandNotFound(args.command_path.join(" ")))?;
        session = session.starting_at(start);
    }

    let screen = CrosstermScreen::new(Theme::new(config.theme));
    let mut renderer = LoopRenderer::new(screen, config);
    let result = session.run(&mut renderer)?;

    if result.cancelled {
        info!("Session cancelled, nothing to run.");
        return Ok(());
    }

    if !result.should_execute() {
        println!("Command execution cancelled by user.");
        return Ok(());
    }

    let line = execution::resolve_invocation(&catalog_file.command, &catalog, &result)?;
    println!("Executing command:\n{line}");

    if args.dry_run {
        println!("Dry run is specified, exiting without executing.");
        return Ok(());
    }

    let shell = env::var("SHELL").unwrap_or_else(|_| DEFAULT_SHELL.to_string());
    execution::execute_in_shell(&shell, &line)
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
