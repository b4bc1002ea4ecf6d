// dpkg status database: installed state, versions, and virtual package providers

use super::PackageBackend;
use crate::error::CollectError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Entry {
    package: String,
    version: String,
    installed: bool,
    provides: Vec<String>,
}

/// Parsed `/var/lib/dpkg/status`, in file order.
#[derive(Debug, Clone, Default)]
pub struct DpkgDatabase {
    entries: Vec<Entry>,
}

/// Names from a `Provides:` value, without version constraints or arch qualifiers.
fn parse_provides(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|item| {
            let name = item.split_whitespace().next()?;
            let name = name.split(':').next().unwrap_or(name);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

impl DpkgDatabase {
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        let mut current = Entry::default();

        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.package.is_empty() {
                    entries.push(std::mem::take(&mut current));
                } else {
                    current = Entry::default();
                }
                continue;
            }
            if line.starts_with(' ') || line.starts_with('\t') {
                // Continuation of a multi-line field we do not use.
                continue;
            }
            let Some((field, value)) = line.split_once(':') else {
                tracing::debug!(line, "ignoring malformed dpkg status line");
                continue;
            };
            let value = value.trim();
            match field {
                "Package" => current.package = value.to_string(),
                "Version" => current.version = value.to_string(),
                "Status" => {
                    current.installed = value.split_whitespace().nth(2) == Some("installed")
                }
                "Provides" => current.provides = parse_provides(value),
                _ => {}
            }
        }
        if !current.package.is_empty() {
            entries.push(current);
        }
        Self { entries }
    }

    /// `name-version` for an installed package, or for the first installed provider
    /// when `name` is virtual.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if let Some(direct) = self
            .entries
            .iter()
            .find(|e| e.installed && e.package == name)
        {
            return Some(format!("{}-{}", name, direct.version));
        }
        self.entries
            .iter()
            .find(|e| e.installed && e.provides.iter().any(|p| p == name))
            .map(|provider| format!("{}-{}", name, provider.version))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct DpkgBackend {
    status_path: PathBuf,
}

impl DpkgBackend {
    /// Available when the status database can be opened.
    pub fn probe(status_path: &Path) -> Result<Self, CollectError> {
        std::fs::File::open(status_path).map_err(|e| CollectError::io(status_path, e))?;
        Ok(Self {
            status_path: status_path.to_path_buf(),
        })
    }

    fn load(&self) -> Result<DpkgDatabase, CollectError> {
        let text = std::fs::read_to_string(&self.status_path)
            .map_err(|e| CollectError::io(&self.status_path, e))?;
        Ok(DpkgDatabase::parse(&text))
    }
}

impl PackageBackend for DpkgBackend {
    fn kind(&self) -> &'static str {
        "dpkg"
    }

    fn list_installed(&self, names: &BTreeSet<String>) -> Result<BTreeSet<String>, CollectError> {
        let db = self.load()?;
        Ok(names.iter().filter_map(|name| db.resolve(name)).collect())
    }
}
