//! Providers for event identifiers and timestamps.
//!
//! Events never reach for the system clock or the OS random source directly;
//! the aggregate that records them asks its clock. Tests inject a
//! [`SteppingClock`] to get the same ids and timestamps on every run.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use common::EventId;
use uuid::Uuid;

/// Source of event ids and timestamps.
pub trait EventClock: Send + Sync + fmt::Debug {
    /// Returns a fresh, unique event id.
    fn next_event_id(&self) -> EventId;

    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock plus random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl EventClock for SystemClock {
    fn next_event_id(&self) -> EventId {
        EventId::new()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock: ids count up from 1 and time advances one second per id.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    issued: AtomicU64,
}

impl SteppingClock {
    /// Creates a clock whose first tick is `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            issued: AtomicU64::new(0),
        }
    }

    /// Creates a clock starting at the Unix epoch.
    pub fn from_epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl EventClock for SteppingClock {
    fn next_event_id(&self) -> EventId {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        EventId::from_uuid(Uuid::from_u128(u128::from(n)))
    }

    fn now(&self) -> DateTime<Utc> {
        let ticks = i64::try_from(self.issued()).unwrap_or(i64::MAX);
        self.start + Duration::seconds(ticks)
    }
}

/// Cheaply clonable handle to a clock, defaulting to [`SystemClock`].
#[derive(Clone)]
pub struct SharedClock(Arc<dyn EventClock>);

impl SharedClock {
    pub fn new(clock: impl EventClock + 'static) -> Self {
        Self(Arc::new(clock))
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl fmt::Debug for SharedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedClock").field(&self.0).finish()
    }
}

impl std::ops::Deref for SharedClock {
    type Target = dyn EventClock;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
