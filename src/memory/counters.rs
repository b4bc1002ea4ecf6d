// Per-second rates over cumulative /proc/vmstat counters.

use std::time::Instant;

/// Cumulative kernel counters tracked between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    SwapIn,
    SwapOut,
    PageFault,
    MajorFault,
}

impl Counter {
    pub const ALL: [Counter; 4] = [
        Counter::SwapIn,
        Counter::SwapOut,
        Counter::PageFault,
        Counter::MajorFault,
    ];

    /// Key of this counter in /proc/vmstat.
    pub fn vmstat_key(self) -> &'static str {
        match self {
            Counter::SwapIn => "pswpin",
            Counter::SwapOut => "pswpout",
            Counter::PageFault => "pgfault",
            Counter::MajorFault => "pgmajfault",
        }
    }

    pub fn from_vmstat_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.vmstat_key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterState {
    pub previous_value: Option<u64>,
    pub previous_timestamp: Option<Instant>,
    pub last_rate: u64,
}

impl CounterState {
    fn bootstrap(&mut self, value: u64, now: Instant) -> u64 {
        self.previous_value = Some(value);
        self.previous_timestamp = Some(now);
        self.last_rate = 0;
        0
    }

    fn observe(&mut self, value: u64, now: Instant) -> u64 {
        let (Some(previous), Some(since)) = (self.previous_value, self.previous_timestamp) else {
            return self.bootstrap(value, now);
        };

        let interval = now
            .checked_duration_since(since)
            .unwrap_or_default()
            .as_nanos();
        if interval == 0 {
            // Clock did not advance: no-update tick.
            return self.last_rate;
        }
        if value < previous {
            // Counter reset or wrapped.
            tracing::debug!(previous, value, "counter went backwards, re-bootstrapping");
            return self.bootstrap(value, now);
        }

        let rate = u128::from(value - previous) * 1_000_000_000 / interval;
        self.previous_value = Some(value);
        self.previous_timestamp = Some(now);
        self.last_rate = u64::try_from(rate).unwrap_or(u64::MAX);
        self.last_rate
    }
}

/// Prior value and timestamp for each tracked counter.
///
/// Not synchronized: `observe` takes `&mut self`, so samples are serialized by the owner.
#[derive(Debug, Clone, Default)]
pub struct CounterDeltaEngine {
    states: [CounterState; 4],
}

impl CounterDeltaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current raw value and returns `floor(delta / seconds)`.
    /// The first observation of a counter always reports 0.
    pub fn observe(&mut self, counter: Counter, value: u64, now: Instant) -> u64 {
        self.states[counter.index()].observe(value, now)
    }

    pub fn last_rate(&self, counter: Counter) -> u64 {
        self.states[counter.index()].last_rate
    }

    pub fn state(&self, counter: Counter) -> &CounterState {
        &self.states[counter.index()]
    }
}
