//! Step execution with combined-output log capture.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use crate::env;
use crate::error::{Result, SuiteError};
use crate::step::Step;

/// Result of a single step execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code (0 = success, -1 for signal deaths).
    pub exit_code: i32,

    /// Log file holding the step's combined output.
    pub log_path: PathBuf,
}

impl ExecutionResult {
    /// Whether this step passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// Step runner that spawns one child process and captures its output.
pub struct StepRunner;

impl StepRunner {
    /// Execute a single step and return its exit code and log location.
    ///
    /// The child's stdout and stderr are both redirected into the step's
    /// log file, preceded by a line echoing the invoked command. The log
    /// file exists and is flushed on every exit path, spawn failure
    /// included, so it can always be tailed afterwards.
    ///
    /// Inability to spawn (e.g. a missing executable) is an error;
    /// a child that merely exits non-zero is not.
    pub async fn execute(step: &Step) -> Result<ExecutionResult> {
        if step.command.is_empty() {
            return Err(SuiteError::EmptyCommand {
                label: step.label.clone(),
            });
        }

        if let Some(parent) = step.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut log = std::fs::File::create(&step.log_path)?;
        writeln!(log, "+ {}", step.command.join(" "))?;
        log.flush()?;

        let child_env = env::derive(&env::ambient_env(), &step.cwd)?;

        let program = &step.command[0];
        let args = &step.command[1..];

        // Both handles share one file description, so writes interleave
        // in arrival order like a shell's `2>&1` redirect.
        let stdout = Stdio::from(log.try_clone()?);
        let stderr = Stdio::from(log);

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&step.cwd)
            .env_clear()
            .envs(&child_env)
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|source| SuiteError::Spawn {
                label: step.label.clone(),
                source,
            })?;

        let status = child.wait().await?;

        Ok(ExecutionResult {
            exit_code: status.code().unwrap_or(-1),
            log_path: step.log_path.clone(),
        })
    }
}
