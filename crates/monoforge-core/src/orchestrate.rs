//! Sequential external-command orchestration
//!
//! Commands run strictly in order with inherited stdio, so installers and
//! generators stay visibly progressing. The first required command that
//! fails stops the sequence; files already materialized stay on disk so the
//! user can fix the cause and resume by running the remaining steps manually.

use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// One subprocess invocation. This engine only sequences these and checks
/// exit status; retry and backoff belong to the tools themselves.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub allow_failure: bool,
}

impl ExternalCommand {
    pub fn new(program: &str, args: &[&str], working_dir: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            working_dir: working_dir.to_path_buf(),
            allow_failure: false,
        }
    }

    /// Mark this command best-effort: a failure logs a warning and the
    /// sequence continues.
    pub fn allow_failure(mut self) -> Self {
        self.allow_failure = true;
        self
    }

    /// Shell-style rendering for log lines and failure reports.
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The first required command that failed, if any.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    /// Index into the command sequence.
    pub index: usize,
    /// Rendered command line, for the failure report.
    pub command: String,
    /// Exit code; `None` when the process could not be spawned or was
    /// killed by a signal.
    pub exit_code: Option<i32>,
}

#[derive(Debug, Default)]
pub struct OrchestrationResult {
    /// How many commands actually started (including a failing one).
    pub commands_run: usize,
    pub failure: Option<CommandFailure>,
}

impl OrchestrationResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Run `commands` strictly in order, fail-fast on the first required
/// non-zero exit. No retries, no rollback, no timeouts - a hanging external
/// tool hangs the run, by design of the sequential model.
pub async fn run(commands: &[ExternalCommand]) -> OrchestrationResult {
    let mut result = OrchestrationResult::default();

    for (index, command) in commands.iter().enumerate() {
        println!();
        println!("{} {}", "->".blue(), command.display_line().bold());

        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .status()
            .await;
        result.commands_run += 1;

        let exit_code = match status {
            Ok(status) if status.success() => continue,
            Ok(status) => status.code(),
            Err(_) => None,
        };

        if command.allow_failure {
            eprintln!(
                "{} {} failed, continuing",
                "Warning:".yellow(),
                command.display_line()
            );
            continue;
        }

        result.failure = Some(CommandFailure {
            index,
            command: command.display_line(),
            exit_code,
        });
        break;
    }

    result
}
