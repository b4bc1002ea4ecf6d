// Shared test fakes for the injectable collaborators
#![allow(dead_code)]

use guest_agent::disks::{FilesystemStats, FsStat};
use guest_agent::error::CollectError;
use guest_agent::memory::MemorySource;
use guest_agent::network::{NicBackend, NicDescription};
use guest_agent::packages::PackageBackend;
use guest_agent::process::{LaunchOutcome, ProcessOutput, ProcessRunner};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn key(argv: &[&str]) -> Vec<String> {
    argv.iter().map(|s| s.to_string()).collect()
}

/// Canned process outputs keyed by exact argv; records launches.
#[derive(Default)]
pub struct FakeRunner {
    outputs: HashMap<Vec<String>, ProcessOutput>,
    launched: Mutex<Vec<Vec<String>>>,
    fail_launches: bool,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, argv: &[&str], stdout: &str, success: bool) -> Self {
        self.outputs.insert(
            key(argv),
            ProcessOutput {
                success,
                stdout: stdout.to_string(),
            },
        );
        self
    }

    pub fn failing_launches(mut self) -> Self {
        self.fail_launches = true;
        self
    }

    pub fn launched(&self) -> Vec<Vec<String>> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessRunner for FakeRunner {
    fn output(&self, argv: &[&str]) -> Result<ProcessOutput, CollectError> {
        self.outputs
            .get(&key(argv))
            .cloned()
            .ok_or_else(|| CollectError::Process {
                program: argv.first().unwrap_or(&"").to_string(),
                detail: "not found".into(),
            })
    }

    fn launch(&self, argv: &[&str]) -> LaunchOutcome {
        self.launched.lock().unwrap().push(key(argv));
        if self.fail_launches {
            LaunchOutcome::LaunchFailed
        } else {
            LaunchOutcome::Launched
        }
    }
}

#[derive(Default)]
struct MemTexts {
    meminfo: Option<String>,
    vmstat: Option<String>,
}

/// Memory source whose texts can be swapped between samples; `None` reads fail.
#[derive(Clone, Default)]
pub struct FakeMemorySource {
    inner: Arc<Mutex<MemTexts>>,
}

impl FakeMemorySource {
    pub fn new(meminfo: &str, vmstat: &str) -> Self {
        let source = Self::default();
        source.set(Some(meminfo), Some(vmstat));
        source
    }

    pub fn set(&self, meminfo: Option<&str>, vmstat: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        inner.meminfo = meminfo.map(str::to_string);
        inner.vmstat = vmstat.map(str::to_string);
    }

    pub fn set_vmstat(&self, vmstat: &str) {
        self.inner.lock().unwrap().vmstat = Some(vmstat.to_string());
    }

    fn read(text: &Option<String>, name: &str) -> Result<String, CollectError> {
        text.clone().ok_or_else(|| CollectError::Io {
            path: PathBuf::from(name),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        })
    }
}

impl MemorySource for FakeMemorySource {
    fn meminfo(&self) -> Result<String, CollectError> {
        Self::read(&self.inner.lock().unwrap().meminfo, "meminfo")
    }

    fn vmstat(&self) -> Result<String, CollectError> {
        Self::read(&self.inner.lock().unwrap().vmstat, "vmstat")
    }
}

pub fn vmstat(swap_in: u64, swap_out: u64, pgfault: u64, pgmajfault: u64) -> String {
    format!(
        "nr_free_pages 12345\npswpin {}\npswpout {}\npgfault {}\npgmajfault {}\n",
        swap_in, swap_out, pgfault, pgmajfault
    )
}

pub const MEMINFO: &str = "\
MemTotal:        4000000 kB
MemFree:          500000 kB
MemAvailable:    2500000 kB
Buffers:          100000 kB
Cached:          1448576 kB
SwapTotal:       1000000 kB
SwapFree:         750000 kB
";

/// NIC backend over fixed descriptions; names in `broken` fail to describe.
#[derive(Default)]
pub struct FakeNics {
    pub order: Vec<String>,
    pub nics: HashMap<String, NicDescription>,
    pub broken: BTreeSet<String>,
    pub listing_fails: bool,
}

impl FakeNics {
    pub fn add(mut self, desc: NicDescription) -> Self {
        self.order.push(desc.name.clone());
        self.nics.insert(desc.name.clone(), desc);
        self
    }

    pub fn broken(mut self, name: &str) -> Self {
        self.order.push(name.to_string());
        self.broken.insert(name.to_string());
        self
    }
}

impl NicBackend for FakeNics {
    fn device_names(&self) -> Result<Vec<String>, CollectError> {
        if self.listing_fails {
            return Err(CollectError::Interface("netlink down".into()));
        }
        Ok(self.order.clone())
    }

    fn describe(&self, name: &str) -> Result<NicDescription, CollectError> {
        if self.broken.contains(name) {
            return Err(CollectError::Interface(format!("{} vanished", name)));
        }
        self.nics
            .get(name)
            .cloned()
            .ok_or_else(|| CollectError::Interface(format!("{} unknown", name)))
    }
}

pub fn nic(name: &str, up: bool, loopback: bool) -> NicDescription {
    NicDescription {
        name: name.to_string(),
        up,
        loopback,
        ipv4_addresses: Some(vec![]),
        ..Default::default()
    }
}

/// statvfs stand-in keyed by mount path; unknown paths fail with EACCES.
#[derive(Default)]
pub struct FakeFsStats {
    pub stats: HashMap<PathBuf, FsStat>,
}

impl FakeFsStats {
    pub fn with(mut self, path: &str, block_size: u64, total_blocks: u64, free_blocks: u64) -> Self {
        self.stats.insert(
            PathBuf::from(path),
            FsStat {
                block_size,
                total_blocks,
                free_blocks,
            },
        );
        self
    }
}

impl FilesystemStats for FakeFsStats {
    fn stat(&self, path: &Path) -> Result<FsStat, CollectError> {
        self.stats
            .get(path)
            .copied()
            .ok_or_else(|| CollectError::Statvfs {
                path: path.to_path_buf(),
                source: nix::errno::Errno::EACCES,
            })
    }
}

/// Package backend answering from a fixed map; `fails` makes every call error.
pub struct FakePackages {
    pub kind: &'static str,
    pub installed: HashMap<String, Vec<String>>,
    pub fails: bool,
}

impl FakePackages {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            installed: HashMap::new(),
            fails: false,
        }
    }

    pub fn with(mut self, name: &str, records: &[&str]) -> Self {
        self.installed.insert(
            name.to_string(),
            records.iter().map(|r| r.to_string()).collect(),
        );
        self
    }
}

impl PackageBackend for FakePackages {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn list_installed(&self, names: &BTreeSet<String>) -> Result<BTreeSet<String>, CollectError> {
        if self.fails {
            return Err(CollectError::BackendUnavailable(self.kind));
        }
        Ok(names
            .iter()
            .filter_map(|n| self.installed.get(n))
            .flatten()
            .cloned()
            .collect())
    }
}

pub fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}
