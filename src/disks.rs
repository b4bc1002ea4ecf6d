// Disk usage per mounted filesystem, from the mount table and statvfs

use crate::error::CollectError;
use crate::models::DiskUsageEntry;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Block counts for one mounted filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStat {
    pub block_size: u64,
    pub total_blocks: u64,
    pub free_blocks: u64,
}

pub trait FilesystemStats: Send + Sync {
    fn stat(&self, path: &Path) -> Result<FsStat, CollectError>;
}

/// statvfs(3) via nix.
#[derive(Debug, Default, Clone, Copy)]
pub struct Statvfs;

impl FilesystemStats for Statvfs {
    fn stat(&self, path: &Path) -> Result<FsStat, CollectError> {
        let stats = nix::sys::statvfs::statvfs(path).map_err(|source| CollectError::Statvfs {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(FsStat {
            block_size: stats.block_size() as u64,
            total_blocks: stats.blocks() as u64,
            free_blocks: stats.blocks_free() as u64,
        })
    }
}

/// Decodes the octal escapes the kernel writes for whitespace and backslash in mount paths.
/// Anything that is not a three-digit octal escape is kept as-is.
pub fn unescape_mount_path(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = bytes[i + 1..i + 4]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// One parsed mount-table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub path: String,
    pub fs_type: String,
}

impl MountEntry {
    pub fn parse(line: &str) -> Result<Self, CollectError> {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(device), Some(path), Some(fs_type)) => Ok(Self {
                device: device.to_string(),
                path: unescape_mount_path(path),
                fs_type: fs_type.to_string(),
            }),
            _ => Err(CollectError::parse("mount table line", format!("{:?}", line))),
        }
    }
}

pub struct DiskUsageSampler {
    mounts_path: PathBuf,
    stats: Box<dyn FilesystemStats>,
}

impl Default for DiskUsageSampler {
    fn default() -> Self {
        Self::new("/proc/mounts", Box::new(Statvfs))
    }
}

impl DiskUsageSampler {
    pub fn new(mounts_path: impl Into<PathBuf>, stats: Box<dyn FilesystemStats>) -> Self {
        Self {
            mounts_path: mounts_path.into(),
            stats,
        }
    }

    #[instrument(skip(self, ignored_fs), fields(operation = "list_disk_usage"))]
    pub fn list_disk_usage(&self, ignored_fs: &BTreeSet<String>) -> Vec<DiskUsageEntry> {
        let table = match std::fs::read_to_string(&self.mounts_path) {
            Ok(table) => table,
            Err(e) => {
                let e = CollectError::io(&self.mounts_path, e);
                tracing::warn!(error = %e, "Error during reading mounted devices");
                return Vec::new();
            }
        };

        let mut usages = Vec::new();
        for line in table.lines().filter(|l| !l.trim().is_empty()) {
            match self.usage_for(line, ignored_fs) {
                Ok(Some(entry)) => usages.push(entry),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Error retrieving disk usage."),
            }
        }
        usages
    }

    fn usage_for(
        &self,
        line: &str,
        ignored_fs: &BTreeSet<String>,
    ) -> Result<Option<DiskUsageEntry>, CollectError> {
        let mount = MountEntry::parse(line)?;
        if ignored_fs.contains(&mount.fs_type) {
            return Ok(None);
        }
        let stat = self.stats.stat(Path::new(&mount.path))?;
        let total = stat.block_size.saturating_mul(stat.total_blocks);
        let free = stat.block_size.saturating_mul(stat.free_blocks);
        Ok(Some(DiskUsageEntry {
            path: mount.path,
            filesystem_type: mount.fs_type,
            total_bytes: total,
            used_bytes: total.saturating_sub(free),
        }))
    }
}
