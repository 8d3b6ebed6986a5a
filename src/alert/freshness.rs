/// Cache row freshness.
///
/// Comparison rows older than the freshness window are ignored and the
/// roster is refetched. Fetch cadence is roughly hourly, so a 60-minute
/// window means "the last fetch cycle".
///
/// # Clock injection
/// The predicate takes `now` as a parameter, and components that need the
/// current time hold a `Clock` rather than calling `Utc::now()` themselves.
/// Tests pin time with `FixedClock`.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ---------------------------------------------------------------------------
// Staleness check
// ---------------------------------------------------------------------------

/// Returns `true` if `fetched_at` is older than `max_age` relative to `now`.
///
/// Staleness is strictly greater than the threshold:
///   age > max_age  →  stale
///   age == max_age →  not stale
///
/// Timestamps in the future (clock skew between writer and reader) are
/// fresh.
pub fn is_stale_at(fetched_at: DateTime<Utc>, max_age: Duration, now: DateTime<Utc>) -> bool {
    now - fetched_at > max_age
}

/// Lower bound of the freshness window ending at `now`.
pub fn window_start(max_age: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
    now - max_age
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
