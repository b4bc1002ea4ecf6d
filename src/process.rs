// External process collaborator: captured runs for queries, fire-and-forget launches for commands.

use crate::error::CollectError;
use std::process::{Command, Stdio};

/// Captured result of a completed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
}

/// Whether a fire-and-forget process was started. Completion is never awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Launched,
    LaunchFailed,
}

pub trait ProcessRunner: Send + Sync {
    /// Runs `argv` to completion and captures stdout.
    fn output(&self, argv: &[&str]) -> Result<ProcessOutput, CollectError>;

    /// Starts `argv` and returns as soon as the process is spawned.
    fn launch(&self, argv: &[&str]) -> LaunchOutcome;
}

/// Runs real processes via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

fn split_argv<'a>(argv: &'a [&'a str]) -> Result<(&'a str, &'a [&'a str]), CollectError> {
    argv.split_first()
        .map(|(program, args)| (*program, args))
        .ok_or_else(|| CollectError::Process {
            program: String::new(),
            detail: "empty command line".into(),
        })
}

impl ProcessRunner for SystemRunner {
    fn output(&self, argv: &[&str]) -> Result<ProcessOutput, CollectError> {
        let (program, args) = split_argv(argv)?;
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| CollectError::Process {
                program: program.to_string(),
                detail: e.to_string(),
            })?;
        Ok(ProcessOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    fn launch(&self, argv: &[&str]) -> LaunchOutcome {
        let (program, args) = match split_argv(argv) {
            Ok(split) => split,
            Err(e) => {
                tracing::warn!(error = %e, operation = "launch", "refusing to launch");
                return LaunchOutcome::LaunchFailed;
            }
        };
        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program, error = %e, operation = "launch", "process launch failed");
                return LaunchOutcome::LaunchFailed;
            }
        };

        // Reap the child off-thread so it never lingers as a zombie.
        let program = program.to_string();
        let reaper = std::thread::Builder::new()
            .name("reaper".into())
            .spawn(move || match child.wait() {
                Ok(status) if status.success() => {
                    tracing::debug!(program = %program, "process exited");
                }
                Ok(status) => {
                    tracing::warn!(program = %program, status = %status, "process exited with failure");
                }
                Err(e) => {
                    tracing::warn!(program = %program, error = %e, "waiting for process failed");
                }
            });
        if let Err(e) = reaper {
            tracing::debug!(error = %e, "could not spawn reaper thread");
        }
        LaunchOutcome::Launched
    }
}
