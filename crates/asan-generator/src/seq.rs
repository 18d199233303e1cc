use crate::IdGenerator;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates sequential ids like "rec000000", "rec000001".
///
/// Unique within a single instance. Mostly useful for tests that want
/// predictable ids.
#[derive(Debug)]
pub struct SequentialGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl SequentialGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a generator whose first id uses `offset` as its counter.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{:06}", self.prefix, count)
    }
}
