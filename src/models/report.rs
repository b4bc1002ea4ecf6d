// Full guest report: one read of every accessor

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{DiskUsageEntry, MemorySnapshot, NetworkInterface};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestReport {
    /// Unix milliseconds at collection start.
    pub timestamp: u64,
    pub machine_name: String,
    pub fqdn: String,
    pub os_version: String,
    pub network_interfaces: Vec<NetworkInterface>,
    pub applications: BTreeSet<String>,
    /// MiB
    pub available_ram: u64,
    pub disk_usage: Vec<DiskUsageEntry>,
    pub memory_stats: MemorySnapshot,
    pub users: BTreeSet<String>,
    pub active_user: String,
}
