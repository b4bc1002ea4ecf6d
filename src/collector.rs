// One read interface over every guest fact, for the reporting loop

use crate::capability::Capability;
use crate::config::AppConfig;
use crate::disks::{DiskUsageSampler, Statvfs};
use crate::memory::{MemorySource, MemoryStatsSampler, ProcMemorySource};
use crate::models::{DiskUsageEntry, GuestReport, MemorySnapshot, NetworkInterface};
use crate::network::NetworkInterfaceEnumerator;
use crate::packages::{DpkgBackend, PackageInventory, RpmBackend, parse_application_list};
use crate::process::ProcessRunner;
use crate::system;
use crate::users::UserSessionQuery;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

/// Samplers and settings a collector is assembled from.
pub struct CollectorParts {
    pub runner: Arc<dyn ProcessRunner>,
    pub memory: MemoryStatsSampler<Box<dyn MemorySource>>,
    pub packages: PackageInventory,
    pub network: NetworkInterfaceEnumerator,
    pub disks: DiskUsageSampler,
    pub applications: BTreeSet<String>,
    pub ignored_fs: BTreeSet<String>,
}

pub struct DataCollector {
    runner: Arc<dyn ProcessRunner>,
    memory: MemoryStatsSampler<Box<dyn MemorySource>>,
    packages: PackageInventory,
    network: NetworkInterfaceEnumerator,
    disks: DiskUsageSampler,
    users: UserSessionQuery,
    applications: BTreeSet<String>,
    ignored_fs: BTreeSet<String>,
}

impl DataCollector {
    /// Probes every optional backend once and wires the real system sources.
    pub fn probe(config: &AppConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        let sources = &config.sources;
        let rpm = Capability::from_probe(
            "rpm",
            RpmBackend::probe(&sources.rpm_db_path, runner.clone()),
        );
        let dpkg = Capability::from_probe("dpkg", DpkgBackend::probe(&sources.dpkg_status_path));
        let memory_source: Box<dyn MemorySource> =
            Box::new(ProcMemorySource::new(&sources.proc_root));

        Self::from_parts(CollectorParts {
            runner,
            memory: MemoryStatsSampler::new(memory_source),
            packages: PackageInventory::from_capabilities(rpm, dpkg),
            network: NetworkInterfaceEnumerator::probe(),
            disks: DiskUsageSampler::new(&sources.mounts_path, Box::new(Statvfs)),
            applications: parse_application_list(&config.general.applications_list),
            ignored_fs: config.general.ignored_fs.clone(),
        })
    }

    pub fn from_parts(parts: CollectorParts) -> Self {
        let CollectorParts {
            runner,
            memory,
            packages,
            network,
            disks,
            applications,
            ignored_fs,
        } = parts;
        Self {
            users: UserSessionQuery::new(runner.clone()),
            runner,
            memory,
            packages,
            network,
            disks,
            applications,
            ignored_fs,
        }
    }

    pub fn machine_name(&self) -> String {
        system::machine_name()
    }

    pub fn fqdn(&self) -> String {
        system::fqdn(self.runner.as_ref())
    }

    pub fn os_version(&self) -> String {
        system::os_version()
    }

    pub fn network_interfaces(&self) -> Vec<NetworkInterface> {
        self.network.list_interfaces()
    }

    /// Installed packages among the configured application list.
    pub fn applications(&self) -> BTreeSet<String> {
        self.packages.list_packages(&self.applications)
    }

    /// Free + buffers + cached, in MiB; 0 when /proc/meminfo is unreadable.
    #[instrument(skip(self), fields(operation = "available_ram"))]
    pub fn available_ram(&self) -> u64 {
        self.memory.available_ram_mib().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "available RAM failed");
            0
        })
    }

    pub fn disk_usage(&self) -> Vec<DiskUsageEntry> {
        self.disks.list_disk_usage(&self.ignored_fs)
    }

    /// Advances the vmstat counter state; `&mut self` keeps sampling serialized.
    #[instrument(skip(self), fields(operation = "memory_stats"))]
    pub fn memory_stats(&mut self) -> MemorySnapshot {
        self.memory.sample()
    }

    pub fn users(&self) -> BTreeSet<String> {
        self.users.list_users()
    }

    pub fn active_user(&self) -> String {
        self.users.active_user()
    }

    /// Reads every accessor once.
    #[instrument(skip(self), fields(operation = "report"))]
    pub fn report(&mut self) -> GuestReport {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    operation = "get_timestamp",
                    "system time error"
                );
                0
            });

        GuestReport {
            timestamp,
            machine_name: self.machine_name(),
            fqdn: self.fqdn(),
            os_version: self.os_version(),
            network_interfaces: self.network_interfaces(),
            applications: self.applications(),
            available_ram: self.available_ram(),
            disk_usage: self.disk_usage(),
            memory_stats: self.memory_stats(),
            users: self.users(),
            active_user: self.active_user(),
        }
    }
}
