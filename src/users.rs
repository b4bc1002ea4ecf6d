// Logged-in users via the users(1) utility

use crate::process::ProcessRunner;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Reported when nobody is logged in.
pub const NO_ACTIVE_USER: &str = "None";

const USERS_BIN: &str = "/usr/bin/users";

pub struct UserSessionQuery {
    runner: Arc<dyn ProcessRunner>,
}

impl UserSessionQuery {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Session owners in the order users(1) prints them (one token per session).
    fn sessions(&self) -> Vec<String> {
        match self.runner.output(&[USERS_BIN]) {
            Ok(out) if out.success => out.stdout.split_whitespace().map(str::to_string).collect(),
            Ok(_) => {
                tracing::warn!(operation = "list_users", "users exited with failure");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(operation = "list_users", error = %e, "Error retrieving logged in users.");
                Vec::new()
            }
        }
    }

    pub fn list_users(&self) -> BTreeSet<String> {
        self.sessions().into_iter().collect()
    }

    pub fn active_user(&self) -> String {
        self.sessions()
            .into_iter()
            .next()
            .unwrap_or_else(|| NO_ACTIVE_USER.to_string())
    }
}
