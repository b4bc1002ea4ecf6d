// Memory snapshot model

use serde::{Deserialize, Serialize};

/// Point-in-time memory figures (kB) plus per-second rates derived from /proc/vmstat counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub mem_total: u64,
    pub mem_free: u64,
    pub mem_unused: u64,
    pub mem_buffers: u64,
    pub mem_cached: u64,
    pub swap_total: u64,
    pub swap_usage: u64,
    #[serde(rename = "swap_in")]
    pub swap_in_rate: u64,
    #[serde(rename = "swap_out")]
    pub swap_out_rate: u64,
    #[serde(rename = "pageflt")]
    pub page_fault_rate: u64,
    #[serde(rename = "majflt")]
    pub major_fault_rate: u64,
}
