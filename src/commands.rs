// Host-issued commands mapped to local, fire-and-forget actions

use crate::config::CommandsConfig;
use crate::process::{LaunchOutcome, ProcessRunner};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Opaque login token handed from the host to the credential server.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credentials(pub String);

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

/// Receives single-sign-on credentials for the guest login session.
pub trait CredentialSink: Send + Sync {
    fn notify_authenticated(&self, credentials: &Credentials);
}

/// Stand-in used when the guest has no credential server.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCredentialSink;

impl CredentialSink for NullCredentialSink {
    fn notify_authenticated(&self, _credentials: &Credentials) {}
}

/// Commands accepted from the host, e.g. `{"command": "hibernate", "state": "disk"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    LockScreen,
    Login {
        credentials: Credentials,
    },
    Logoff,
    Shutdown {
        timeout_seconds: u64,
        #[serde(default)]
        message: String,
        #[serde(default)]
        reboot: bool,
    },
    Hibernate {
        state: String,
    },
    SetNumberOfCpus {
        count: u32,
    },
}

impl HostCommand {
    pub fn name(&self) -> &'static str {
        match self {
            HostCommand::LockScreen => "lock_screen",
            HostCommand::Login { .. } => "login",
            HostCommand::Logoff => "logoff",
            HostCommand::Shutdown { .. } => "shutdown",
            HostCommand::Hibernate { .. } => "hibernate",
            HostCommand::SetNumberOfCpus { .. } => "set_number_of_cpus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Helper process spawned; its exit status is only logged.
    Launched,
    LaunchFailed,
    /// Completed in-process (credential handoff) or intentionally ignored.
    Handled,
}

impl From<LaunchOutcome> for CommandOutcome {
    fn from(outcome: LaunchOutcome) -> Self {
        match outcome {
            LaunchOutcome::Launched => CommandOutcome::Launched,
            LaunchOutcome::LaunchFailed => CommandOutcome::LaunchFailed,
        }
    }
}

/// shutdown(8) takes minutes; the host sends seconds. Rounds up, so 0 stays 0 (immediate).
pub fn shutdown_delay_minutes(timeout_seconds: u64) -> u64 {
    timeout_seconds.div_ceil(60)
}

pub struct CommandDispatcher {
    helpers: CommandsConfig,
    runner: Arc<dyn ProcessRunner>,
    credentials: Arc<dyn CredentialSink>,
}

impl CommandDispatcher {
    pub fn new(
        helpers: CommandsConfig,
        runner: Arc<dyn ProcessRunner>,
        credentials: Arc<dyn CredentialSink>,
    ) -> Self {
        Self {
            helpers,
            runner,
            credentials,
        }
    }

    /// Runs one command. Never fails: launch problems are logged and reported as
    /// `LaunchFailed`, and nothing is retried.
    pub fn dispatch(&self, command: &HostCommand) -> CommandOutcome {
        let outcome = match command {
            HostCommand::LockScreen => {
                self.launch("lock session", &[self.helpers.lock_session.as_str()])
            }
            HostCommand::Login { credentials } => {
                self.credentials.notify_authenticated(credentials);
                CommandOutcome::Handled
            }
            HostCommand::Logoff => CommandOutcome::Handled,
            HostCommand::Shutdown {
                timeout_seconds,
                message,
                reboot,
            } => {
                let (param, action) = if *reboot {
                    ("-r", "reboot")
                } else {
                    ("-h", "shutdown")
                };
                let delay = format!("+{}", shutdown_delay_minutes(*timeout_seconds));
                let quoted = format!("\"{}\"", message);
                self.launch(
                    action,
                    &[self.helpers.shutdown.as_str(), param, delay.as_str(), quoted.as_str()],
                )
            }
            HostCommand::Hibernate { state } => {
                self.launch("hibernate", &[self.helpers.hibernate.as_str(), state.as_str()])
            }
            HostCommand::SetNumberOfCpus { count } => {
                tracing::debug!(count, "set_number_of_cpus is not supported on this platform");
                CommandOutcome::Handled
            }
        };
        if outcome == CommandOutcome::LaunchFailed {
            tracing::warn!(command = command.name(), "command could not be started");
        }
        outcome
    }

    fn launch(&self, action: &str, argv: &[&str]) -> CommandOutcome {
        tracing::debug!(action, ?argv, "Executing command");
        self.runner.launch(argv).into()
    }
}
