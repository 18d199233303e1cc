//! Record id generation for the file store.
//!
//! The document store never uses these: its ids come from the database.

pub mod seq;

use asan_core::{Clock, SystemClock};

/// Upper bound (exclusive) of the random offset added to the timestamp.
const MAX_JITTER_MILLIS: i64 = 1_000;

/// Trait for generating record ids.
///
/// Implementations are pure generators that don't interact with storage,
/// so they cannot promise uniqueness within a collection. The caller is
/// responsible for checking a candidate against existing ids.
pub trait IdGenerator: Send + Sync + 'static {
    /// Generates a candidate id.
    fn generate(&self) -> String;
}

/// Generates ids from the current epoch milliseconds plus a random offset
/// below one second, rendered as a decimal string.
///
/// This is not a cryptographic or collision-free scheme: two ids generated
/// within the same second can collide.
#[derive(Debug, Clone, Default)]
pub struct TimestampGenerator<C = SystemClock> {
    clock: C,
}

impl TimestampGenerator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> TimestampGenerator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for TimestampGenerator<C> {
    fn generate(&self) -> String {
        let jitter = rand::random_range(0..MAX_JITTER_MILLIS);
        (self.clock.now_millis() + jitter).to_string()
    }
}
