//! Invocation of the external compilation toolchain and of replayed shell commands

use std::process::{self, Command};

use tracing::{error, info, warn};

use crate::{
    cli::ScriptConfig,
    constants::{ENVIRONMENT_NOT_RUNNING_CODE, ENVIRONMENT_NOT_RUNNING_HELP, SHELL},
    errors::ScriptError,
};

/// The reason an external command failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandFailure {
    /// No development node is reachable
    EnvironmentNotRunning,
    /// Any other failure, with the command's output
    Other(String),
}

/// Classifies the output of a failed command
pub fn classify_command_failure(output: &str) -> CommandFailure {
    if output.contains(ENVIRONMENT_NOT_RUNNING_CODE) {
        CommandFailure::EnvironmentNotRunning
    } else {
        CommandFailure::Other(output.trim().to_string())
    }
}

/// Runs a command line through the shell, returning its stdout on success
pub fn run_shell_command(command: &str) -> Result<String, CommandFailure> {
    let output = Command::new(SHELL)
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|e| CommandFailure::Other(e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(classify_command_failure(&format!("{stderr}{stdout}")))
}

/// Exits the process if the development environment is down, otherwise logs
/// the failure and lets the caller carry on
pub fn handle_command_failure(failure: CommandFailure) {
    match failure {
        CommandFailure::EnvironmentNotRunning => {
            error!("{ENVIRONMENT_NOT_RUNNING_HELP}");
            process::exit(1);
        }
        CommandFailure::Other(output) => warn!("command failed: {output}"),
    }
}

/// Compiles the contracts with the configured build command
pub fn compile(config: &ScriptConfig) -> Result<(), ScriptError> {
    if config.skip_build {
        return Ok(());
    }

    info!("compiling contracts with `{}`", config.build_cmd);
    match run_shell_command(&config.build_cmd) {
        Ok(_) => Ok(()),
        Err(CommandFailure::EnvironmentNotRunning) => {
            handle_command_failure(CommandFailure::EnvironmentNotRunning);
            Ok(())
        }
        Err(CommandFailure::Other(output)) => Err(ScriptError::Compilation(output)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_environment_not_running() {
        let output = "Error HH108: Cannot connect to the network localhost.\n\
                      Please make sure your node is running, and check your internet connection \
                      and networks config";
        assert_eq!(
            classify_command_failure(output),
            CommandFailure::EnvironmentNotRunning
        );
    }

    #[test]
    fn test_classify_other_failure() {
        assert_eq!(
            classify_command_failure("  Error HH700: Artifact for contract \"Foo\" not found.\n"),
            CommandFailure::Other("Error HH700: Artifact for contract \"Foo\" not found.".to_string())
        );
    }

    #[test]
    fn test_run_shell_command() {
        assert_eq!(run_shell_command("echo hello").unwrap(), "hello\n");
        assert_eq!(
            run_shell_command("echo 'Error HH108' >&2; exit 1"),
            Err(CommandFailure::EnvironmentNotRunning)
        );
        assert!(matches!(
            run_shell_command("exit 3"),
            Err(CommandFailure::Other(_))
        ));
    }
}
