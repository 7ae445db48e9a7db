//! Time source injected into the meter registry
//!
//! Timers and the uptime gauge read time through this trait so tests can
//! drive them deterministically with [`MockClock`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub trait Clock: Send + Sync {
    /// Wall-clock time
    fn wall_time(&self) -> DateTime<Utc>;

    /// Monotonic nanoseconds since an arbitrary fixed origin
    fn monotonic_nanos(&self) -> u64;
}

/// System time backed clock
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn arc() -> Arc<dyn Clock> {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Manually advanced clock for tests
pub struct MockClock {
    start: DateTime<Utc>,
    nanos: AtomicU64,
}

impl MockClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, duration: std::time::Duration) {
        self.nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn wall_time(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::nanoseconds(self.nanos.load(Ordering::SeqCst) as i64);
        self.start + elapsed
    }

    fn monotonic_nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}
