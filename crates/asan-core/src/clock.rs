use jiff::{SignedDuration, Timestamp};
use std::sync::{Arc, Mutex};

/// Source of creation timestamps for stored records.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current time of the clock.
    fn now(&self) -> Timestamp;

    /// Returns the current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64 {
        self.now().as_millisecond()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// while a store owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            inner: Arc::new(Mutex::new(now)),
        }
    }

    /// Creates a clock positioned at the given epoch milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if `millis` is outside the range supported by [`Timestamp`].
    pub fn at_millis(millis: i64) -> Self {
        Self::new(Timestamp::from_millisecond(millis).expect("millis should be a valid timestamp"))
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: SignedDuration) {
        let mut now = self
            .inner
            .lock()
            .expect("manual clock lock should not be poisoned");
        *now = *now + duration;
    }

    pub fn set(&self, target: Timestamp) {
        *self
            .inner
            .lock()
            .expect("manual clock lock should not be poisoned") = target;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self
            .inner
            .lock()
            .expect("manual clock lock should not be poisoned")
    }
}
