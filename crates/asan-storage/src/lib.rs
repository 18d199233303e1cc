//! Persistence for the Asan booking backend.
//!
//! [`Database`] is the single entry point. It picks a backend once at
//! startup: the MongoDB-backed [`MongoStore`] when a connection descriptor is
//! configured and reachable, otherwise the JSON-file-backed [`FileStore`].
//! Callers only ever see [`Record`]s, whichever backend is active.
//!
//! ```rust,no_run
//! use asan_storage::{ConnectOptions, Database};
//!
//! # async fn example() -> asan_storage::Result<()> {
//! let options = ConnectOptions::builder()
//!     .data_file("data/data.json")
//!     .remote_uri("mongodb://127.0.0.1:27017/asan")
//!     .build();
//! let db = Database::connect(options).await?;
//!
//! let fields = serde_json::json!({ "pickup": "A", "drop": "B" });
//! let booking = db.add("bookings", fields.as_object().cloned().unwrap_or_default()).await?;
//! assert!(db.find("bookings", |r| r.id() == booking.id()).await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod file;
#[cfg(feature = "mongo")]
pub mod mongo;

pub use asan_core::{Fields, Record, RecordStore, Result, StorageError};
pub use database::{ConnectOptions, Database, StorageMode};
pub use file::FileStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;
