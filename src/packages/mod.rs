// Installed application inventory across optional package managers

mod dpkg;
mod rpm;

pub use dpkg::{DpkgBackend, DpkgDatabase};
pub use rpm::RpmBackend;

use crate::capability::Capability;
use crate::error::CollectError;
use std::collections::BTreeSet;
use tracing::instrument;

/// One package manager able to report installed versions for requested names.
pub trait PackageBackend: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Formatted records (`name-version[-release]`) for the requested names that are installed.
    /// A failure on one name is logged and does not abort the others; `Err` means the backend
    /// could not be consulted at all for this call.
    fn list_installed(&self, names: &BTreeSet<String>) -> Result<BTreeSet<String>, CollectError>;
}

/// Union of every backend found at startup.
pub struct PackageInventory {
    backends: Vec<Box<dyn PackageBackend>>,
}

impl PackageInventory {
    /// Builds from the startup probes of the rpm and dpkg backends.
    pub fn from_capabilities(rpm: Capability<RpmBackend>, dpkg: Capability<DpkgBackend>) -> Self {
        let mut backends: Vec<Box<dyn PackageBackend>> = Vec::new();
        if let Capability::Available(rpm) = rpm {
            backends.push(Box::new(rpm));
        }
        if let Capability::Available(dpkg) = dpkg {
            backends.push(Box::new(dpkg));
        }
        Self::from_backends(backends)
    }

    pub fn from_backends(backends: Vec<Box<dyn PackageBackend>>) -> Self {
        if backends.is_empty() {
            tracing::info!("Unknown package management. Application list report is disabled.");
        } else {
            let kinds: Vec<&str> = backends.iter().map(|b| b.kind()).collect();
            tracing::info!(backends = ?kinds, "package backends detected");
        }
        Self { backends }
    }

    pub fn is_enabled(&self) -> bool {
        !self.backends.is_empty()
    }

    #[instrument(skip(self, requested), fields(operation = "list_packages", requested = requested.len()))]
    pub fn list_packages(&self, requested: &BTreeSet<String>) -> BTreeSet<String> {
        let mut apps = BTreeSet::new();
        if requested.is_empty() {
            return apps;
        }
        for backend in &self.backends {
            match backend.list_installed(requested) {
                Ok(found) => apps.extend(found),
                Err(e) => {
                    tracing::warn!(backend = backend.kind(), error = %e, "package lookup failed");
                }
            }
        }
        tracing::debug!(count = apps.len(), "list_packages done");
        apps
    }
}

/// Splits a whitespace-separated application list, dropping blanks and duplicates.
pub fn parse_application_list(list: &str) -> BTreeSet<String> {
    list.split_whitespace().map(str::to_string).collect()
}
