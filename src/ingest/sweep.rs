//! Rate-limited roster sweep.
//!
//! [`RosterSweep`] walks the roster one city at a time, pausing between
//! lookups, and yields each city's result as it completes. Lookups never
//! overlap; the feed rate-limits bursts.
//!
//! The pause goes through a [`Pacer`] so tests can record delays instead
//! of sleeping.

use crate::ingest::waqi::CityLookup;
use crate::model::{CityReading, FetchError};
use crate::roster::RosterCity;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Records requested pauses without sleeping.
#[derive(Debug, Default, Clone)]
pub struct RecordingPacer {
    pub pauses: Vec<Duration>,
}

impl RecordingPacer {
    pub fn total(&self) -> Duration {
        self.pauses.iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, delay: Duration) {
        self.pauses.push(delay);
    }
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, delay: Duration) {
        (**self).pause(delay)
    }
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

/// Outcome of one city's lookup.
#[derive(Debug)]
pub struct CityFetch<'r> {
    pub city: &'r RosterCity,
    pub result: Result<CityReading, FetchError>,
}

pub struct RosterSweep<'a, L, P> {
    cities: std::slice::Iter<'a, RosterCity>,
    lookup: &'a L,
    pacer: &'a mut P,
    delay: Duration,
    started: bool,
}

impl<'a, L: CityLookup, P: Pacer> RosterSweep<'a, L, P> {
    pub fn new(roster: &'a [RosterCity], lookup: &'a L, pacer: &'a mut P, delay: Duration) -> Self {
        Self {
            cities: roster.iter(),
            lookup,
            pacer,
            delay,
            started: false,
        }
    }
}

impl<'a, L: CityLookup, P: Pacer> Iterator for RosterSweep<'a, L, P> {
    type Item = CityFetch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let city = self.cities.next()?;
        // Delay sits between calls, not before the first one.
        if self.started {
            self.pacer.pause(self.delay);
        }
        self.started = true;
        Some(CityFetch {
            city,
            result: self.lookup.lookup(city),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cities.size_hint()
    }
}

/// Worst-case wall time of a full sweep: every lookup runs to its
/// timeout and every gap waits the full delay.
/// Saturates instead of overflowing.
pub fn latency_bound(roster_len: usize, timeout: Duration, delay: Duration) -> Duration {
    let calls = u32::try_from(roster_len).unwrap_or(u32::MAX);
    timeout.saturating_add(delay).saturating_mul(calls)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
