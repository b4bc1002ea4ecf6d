// RPM database lookups through the rpm CLI

use super::PackageBackend;
use crate::error::CollectError;
use crate::process::ProcessRunner;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

const QUERY_FORMAT: &str = "%{NAME}-%{VERSION}-%{RELEASE}\\n";

pub struct RpmBackend {
    runner: Arc<dyn ProcessRunner>,
}

impl RpmBackend {
    /// Available when the rpm database directory exists and the rpm tool runs.
    pub fn probe(db_path: &Path, runner: Arc<dyn ProcessRunner>) -> Result<Self, CollectError> {
        if !db_path.is_dir() {
            return Err(CollectError::BackendUnavailable("rpm"));
        }
        let version = runner.output(&["rpm", "--version"])?;
        if !version.success {
            return Err(CollectError::BackendUnavailable("rpm"));
        }
        Ok(Self { runner })
    }

    /// Every installed `name-version-release` for one package name.
    fn query(&self, name: &str) -> Result<Vec<String>, CollectError> {
        let output = self
            .runner
            .output(&["rpm", "-q", "--queryformat", QUERY_FORMAT, "--", name])?;
        if !output.success {
            // rpm -q exits non-zero for packages that are not installed.
            return Ok(Vec::new());
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl PackageBackend for RpmBackend {
    fn kind(&self) -> &'static str {
        "rpm"
    }

    fn list_installed(&self, names: &BTreeSet<String>) -> Result<BTreeSet<String>, CollectError> {
        let mut apps = BTreeSet::new();
        for name in names {
            match self.query(name) {
                Ok(records) => apps.extend(records),
                Err(e) => tracing::warn!(package = %name, error = %e, "rpm query failed"),
            }
        }
        Ok(apps)
    }
}
