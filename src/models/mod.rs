// Domain models reported to the host

mod memory;
mod network;
mod report;
mod storage;

pub use memory::MemorySnapshot;
pub use network::NetworkInterface;
pub use report::GuestReport;
pub use storage::DiskUsageEntry;
