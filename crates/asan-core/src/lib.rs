//! Core types and traits for the Asan booking backend.
//!
//! This crate provides the backend-agnostic record shape and the storage
//! capability shared by the file store, the document store and the
//! persistence facade built on top of them.

pub mod clock;
pub mod collection;
pub mod error;
pub mod record;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::KNOWN_COLLECTIONS;
pub use error::{Result, StorageError};
pub use record::{requested_id, sanitize_patch, Fields, Record, CREATED_AT_FIELD, ID_FIELD};
pub use store::RecordStore;
