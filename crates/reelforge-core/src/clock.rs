//! Clock abstraction.
//!
//! No crate in this workspace reads the wall clock directly for a value that
//! ends up in a persisted event, manifest, or plan. Every timestamp is
//! produced by an injected [`Clock`], so tests can supply deterministic
//! values and production callers can supply a real one.

/// Produces an ISO-8601 timestamp string. Implementations in `reelforge-store`
/// and `reelforge-cli` read the real wall clock; [`FixedClock`] here is for
/// tests and for deterministic replays.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// A clock that always returns the same timestamp. Used by tests that need
/// byte-identical repeated output (e.g. `buildFromEvents` idempotency).
#[derive(Debug, Clone)]
pub struct FixedClock {
    pub now_iso8601: String,
}

impl FixedClock {
    pub fn new(now_iso8601: impl Into<String>) -> Self {
        Self {
            now_iso8601: now_iso8601.into(),
        }
    }

    pub fn epoch() -> Self {
        Self::new("1970-01-01T00:00:00Z")
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.now_iso8601.clone()
    }
}

/// A clock that advances by one tick (millisecond-resolution counter encoded
/// into a synthetic ISO-8601 string) every call, for tests that need
/// distinct-but-deterministic timestamps without touching the system clock.
#[derive(Debug)]
pub struct SequentialClock {
    tick: std::sync::atomic::AtomicU64,
    base_seconds: u64,
}

impl SequentialClock {
    pub fn starting_at(base_seconds: u64) -> Self {
        Self {
            tick: std::sync::atomic::AtomicU64::new(0),
            base_seconds,
        }
    }
}

impl Clock for SequentialClock {
    fn now(&self) -> String {
        let n = self.tick.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let total = self.base_seconds + n;
        let days = total / 86_400;
        let rem = total % 86_400;
        let h = rem / 3600;
        let m = (rem % 3600) / 60;
        let s = rem % 60;
        format!("1970-01-{:02}T{:02}:{:02}:{:02}Z", 1 + days, h, m, s)
    }
}
