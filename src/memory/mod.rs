// Memory statistics from /proc/meminfo and /proc/vmstat

pub mod counters;

use crate::error::CollectError;
use crate::models::MemorySnapshot;
pub use counters::{Counter, CounterDeltaEngine, CounterState};
use std::path::PathBuf;
use std::time::Instant;

/// Point-in-time text of the two memory pseudo-files.
pub trait MemorySource: Send {
    fn meminfo(&self) -> Result<String, CollectError>;
    fn vmstat(&self) -> Result<String, CollectError>;
}

impl<T: MemorySource + ?Sized> MemorySource for Box<T> {
    fn meminfo(&self) -> Result<String, CollectError> {
        (**self).meminfo()
    }

    fn vmstat(&self) -> Result<String, CollectError> {
        (**self).vmstat()
    }
}

/// Reads `<root>/meminfo` and `<root>/vmstat`; root is normally `/proc`.
#[derive(Debug, Clone)]
pub struct ProcMemorySource {
    root: PathBuf,
}

impl ProcMemorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, name: &str) -> Result<String, CollectError> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|e| CollectError::io(path, e))
    }
}

impl Default for ProcMemorySource {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl MemorySource for ProcMemorySource {
    fn meminfo(&self) -> Result<String, CollectError> {
        self.read("meminfo")
    }

    fn vmstat(&self) -> Result<String, CollectError> {
        self.read("vmstat")
    }
}

/// Iterates `key value ...` lines, yielding the first two tokens with the value parsed.
/// Lines with fewer than two tokens are ignored; unparsable values are logged and skipped.
fn key_values<'a>(text: &'a str, source: &'static str) -> impl Iterator<Item = (&'a str, u64)> {
    text.lines().filter_map(move |line| {
        let mut tokens = line.split_whitespace();
        let key = tokens.next()?;
        let raw = tokens.next()?;
        match raw.parse::<u64>() {
            Ok(value) => Some((key, value)),
            Err(e) => {
                tracing::warn!(source, key, value = raw, error = %e, "skipping unparsable field");
                None
            }
        }
    })
}

/// Fields of /proc/meminfo this agent reports, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
    pub cached: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemInfo {
    pub fn parse(text: &str) -> Self {
        let mut info = MemInfo::default();
        for (key, value) in key_values(text, "meminfo") {
            match key {
                "MemTotal:" => info.total = value,
                "MemFree:" => info.free = value,
                "Buffers:" => info.buffers = value,
                "Cached:" => info.cached = value,
                "SwapTotal:" => info.swap_total = value,
                "SwapFree:" => info.swap_free = value,
                _ => {}
            }
        }
        info
    }

    /// Free plus reclaimable (buffers, page cache), kB.
    pub fn reclaimable_free(&self) -> u64 {
        self.free + self.buffers + self.cached
    }
}

fn parse_counters(text: &str) -> [Option<u64>; 4] {
    let mut values = [None; 4];
    for (key, value) in key_values(text, "vmstat") {
        if let Some(counter) = Counter::from_vmstat_key(key) {
            values[counter as usize] = Some(value);
        }
    }
    values
}

/// Combines static meminfo figures with vmstat counter rates.
///
/// `sample` takes `&mut self`: concurrent sampling is ruled out by the borrow checker,
/// and callers sharing a sampler across threads must serialize access themselves.
pub struct MemoryStatsSampler<S = ProcMemorySource> {
    source: S,
    counters: CounterDeltaEngine,
    last: MemorySnapshot,
}

impl Default for MemoryStatsSampler {
    fn default() -> Self {
        Self::new(ProcMemorySource::default())
    }
}

impl<S: MemorySource> MemoryStatsSampler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            counters: CounterDeltaEngine::new(),
            last: MemorySnapshot::default(),
        }
    }

    pub fn sample(&mut self) -> MemorySnapshot {
        self.sample_at(Instant::now())
    }

    /// Samples with an explicit timestamp. On a read failure the last good snapshot is
    /// returned (all zeros before the first success) and counter state is left untouched.
    pub fn sample_at(&mut self, now: Instant) -> MemorySnapshot {
        match self.try_sample(now) {
            Ok(snapshot) => {
                self.last = snapshot;
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, operation = "memory_stats", "memory stats failed");
                self.last
            }
        }
    }

    fn try_sample(&mut self, now: Instant) -> Result<MemorySnapshot, CollectError> {
        // Read both sources before touching counter state.
        let meminfo = MemInfo::parse(&self.source.meminfo()?);
        let raw = parse_counters(&self.source.vmstat()?);

        let mut rates = [0u64; 4];
        for counter in Counter::ALL {
            rates[counter as usize] = match raw[counter as usize] {
                Some(value) => self.counters.observe(counter, value, now),
                None => {
                    tracing::debug!(key = counter.vmstat_key(), "counter missing from vmstat");
                    self.counters.last_rate(counter)
                }
            };
        }

        Ok(MemorySnapshot {
            mem_total: meminfo.total,
            mem_free: meminfo.reclaimable_free(),
            mem_unused: meminfo.free,
            mem_buffers: meminfo.buffers,
            mem_cached: meminfo.cached,
            swap_total: meminfo.swap_total,
            swap_usage: meminfo.swap_total.saturating_sub(meminfo.swap_free),
            swap_in_rate: rates[Counter::SwapIn as usize],
            swap_out_rate: rates[Counter::SwapOut as usize],
            page_fault_rate: rates[Counter::PageFault as usize],
            major_fault_rate: rates[Counter::MajorFault as usize],
        })
    }

    /// Free + buffers + cached, in MiB.
    pub fn available_ram_mib(&self) -> Result<u64, CollectError> {
        let meminfo = MemInfo::parse(&self.source.meminfo()?);
        Ok(meminfo.reclaimable_free() / 1024)
    }

    pub fn counters(&self) -> &CounterDeltaEngine {
        &self.counters
    }
}
