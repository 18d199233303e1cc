use crate::error::Result;
use crate::record::{Fields, Record};
use async_trait::async_trait;

/// A collection-oriented record store.
///
/// Implementations own their storage engine and always hand back records in
/// the normalized [`Record`] shape: a string `id`, an integer `createdAt`,
/// and no backend-native key.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Returns every record in the collection in the backend's order.
    ///
    /// An unknown collection yields an empty vector.
    async fn get(&self, collection: &str) -> Result<Vec<Record>>;

    /// Stores a new record and returns it with its assigned `id` and
    /// `createdAt`.
    async fn add(&self, collection: &str, fields: Fields) -> Result<Record>;

    /// Shallow-merges `patch` into the record with the given id.
    ///
    /// Returns `None` if no record has that id. The identity fields are never
    /// overwritten.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Option<Record>>;

    /// Removes the record with the given id.
    ///
    /// Returns `true` if a record existed and was removed.
    async fn remove(&self, collection: &str, id: &str) -> Result<bool>;
}
