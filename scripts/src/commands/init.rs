//! Builds a manifest by replaying a command file

use std::{fs, path::Path};

use tracing::info;

use crate::{
    cli::{InitArgs, ScriptConfig},
    constants::COMMENT_PREFIX,
    errors::ScriptError,
    toolchain::{handle_command_failure, run_shell_command},
};

/// Runs every command in the command file against the configured manifest, in order.
///
/// A failing command is logged and skipped, unless the development environment is
/// down, in which case the process exits.
pub fn init(args: InitArgs, config: &ScriptConfig) -> Result<(), ScriptError> {
    let contents = fs::read_to_string(&args.diamondfile)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", args.diamondfile.display())))?;

    for command in parse_diamond_file(&contents, &config.manifest) {
        info!("{command}");
        match run_shell_command(&command) {
            Ok(stdout) => print!("{stdout}"),
            Err(failure) => handle_command_failure(failure),
        }
    }

    Ok(())
}

/// Lists the commands of a command file, each pointed at the given manifest.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_diamond_file(contents: &str, manifest: &Path) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
        .map(|line| format!("{line} --manifest {}", shell_quote(&manifest.to_string_lossy())))
        .collect()
}

/// Quotes a word for `sh`, leaving words made only of safe characters untouched
fn shell_quote(word: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "/._-+:@=,".contains(c);
    if !word.is_empty() && word.chars().all(is_safe) {
        return word.to_string();
    }

    format!("'{}'", word.replace('\'', r"'\''"))
}
