//! Change stamp policy trait and implementations
//!
//! This module defines the `ChangeStampPolicy` trait, which decides whether
//! entities touched by a committed transaction get their `CHAN` date and
//! time refreshed, and which wall-clock time is written.

use chrono::{DateTime, Utc};

/// Policy trait for stamping modified entities
///
/// The policy is injected into the `Document` so that tests can pin the
/// clock and loaders can switch stamping off.
pub trait ChangeStampPolicy: Send + Sync {
    /// Time to record for a commit, or `None` to leave entities unstamped
    fn stamp_time(&self) -> Option<DateTime<Utc>>;
}

/// Policy that never writes change stamps
///
/// # Example
/// ```
/// use gedgraph_core::policy::{ChangeStampPolicy, NeverStamp};
///
/// assert!(NeverStamp.stamp_time().is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStamp;

impl ChangeStampPolicy for NeverStamp {
    fn stamp_time(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Policy that stamps with the current system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ChangeStampPolicy for SystemClock {
    fn stamp_time(&self) -> Option<DateTime<Utc>> {
        Some(Utc::now())
    }
}

/// Policy that stamps every commit with the same instant
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use gedgraph_core::policy::{ChangeStampPolicy, FixedClock};
///
/// let at = Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap();
/// assert_eq!(FixedClock::new(at).stamp_time(), Some(at));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl ChangeStampPolicy for FixedClock {
    fn stamp_time(&self) -> Option<DateTime<Utc>> {
        Some(self.at)
    }
}
