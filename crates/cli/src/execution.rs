//! Turning a finished session into a shell invocation and running it.

use std::process::{Command, Stdio};

use itertools::Itertools;
use log::info;

use command_deck_core::catalog::Catalog;
use command_deck_core::command_definitions::CommandDefinition;
use command_deck_core::error::{Error, Result};
use command_deck_core::interpolation::render_command;
use command_deck_core::parameters::collect;
use command_deck_core::session::{command_line, shell_quote, SessionResult};

/// The line to hand to the shell for a completed session.
///
/// A command with a `command` template renders it with the session values,
/// quoting each argument so it reaches the program as one word.
/// Any other runnable command resolves to its own command line, that is the
/// path from the root followed by the changed parameters as flags.
///
/// # Errors
///
/// Returns an error if the session selected nothing or the template cannot
/// be rendered.
pub fn resolve_invocation(
    definition: &CommandDefinition,
    catalog: &Catalog,
    result: &SessionResult,
) -> Result<String> {
    let node = result
        .command()
        .ok_or_else(|| Error::CommandNotFound(String::new()))?;
    let origin = &catalog.node(node).origin;
    let selected = definition
        .resolve(origin)
        .ok_or_else(|| Error::DanglingReference(format!("{origin:?}")))?;

    match &selected.command {
        Some(template) => Ok(render_command(template, &result.values)?
            .iter()
            .map(|argument| shell_quote(argument))
            .join(" ")),
        None => Ok(command_line(
            catalog,
            &result.selected_path,
            &collect(catalog, node),
            &result.values,
        )),
    }
}

/// Runs `line` through `shell -c` with the terminal attached.
///
/// # Errors
///
/// Returns an error if the shell cannot be started or exits with non-zero status.
pub fn execute_in_shell(shell: &str, line: &str) -> Result<()> {
    info!("Executing with {shell}: {line}");

    let mut command = Command::new(shell);
    command.args(["-c", line]);
    execute_command(command)
}

/// Executes a command with inherited standard streams.
///
/// # Errors
///
/// Returns an error if command execution fails or exits with non-zero status.
pub fn execute_command(mut command: Command) -> Result<()> {
    let command = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let subprocess_exit_success = command.spawn()?.wait()?.success();

    if subprocess_exit_success {
        Ok(())
    } else {
        Err(Error::SubProcessExit)
    }
}
