use std::sync::Arc;

use asan_core::{Clock, SystemClock};
use asan_storage::Database;

#[derive(Clone)]
pub struct AppState {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, SystemClock)
    }

    pub fn with_clock(db: Database, clock: impl Clock) -> Self {
        Self {
            db,
            clock: Arc::new(clock),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Current time in epoch milliseconds.
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}
