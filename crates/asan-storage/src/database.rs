use crate::file::FileStore;
use asan_core::{Fields, Record, RecordStore, Result};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_DATA_FILE: &str = "data/data.json";
pub const DEFAULT_DATABASE: &str = "asan";

/// Which backend a [`Database`] settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Records live in a local JSON file.
    File,
    /// Records live in a remote document database.
    Remote,
}

impl Display for StorageMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::File => write!(f, "file"),
            StorageMode::Remote => write!(f, "remote"),
        }
    }
}

/// Options for [`Database::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ConnectOptions {
    /// Path of the JSON file used in file mode.
    #[builder(default = PathBuf::from(DEFAULT_DATA_FILE), setter(into))]
    pub data_file: PathBuf,
    /// Connection descriptor of the document database. Blank means none.
    #[builder(default, setter(strip_option, into))]
    pub remote_uri: Option<String>,
    /// Database used when the descriptor does not name one.
    #[builder(default = DEFAULT_DATABASE.to_string(), setter(into))]
    pub default_database: String,
    /// Overrides the client's server selection timeout.
    #[builder(default, setter(strip_option))]
    pub server_selection_timeout: Option<Duration>,
}

/// The persistence facade.
///
/// Backend selection happens once, in [`Database::connect`]. After that every
/// call is routed to the chosen [`RecordStore`]; nothing else ever branches
/// on which backend is active.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn RecordStore>,
    mode: StorageMode,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("mode", &self.mode).finish()
    }
}

impl Database {
    /// Selects and opens a backend.
    ///
    /// A non-blank `remote_uri` is tried first. Any failure to reach the
    /// document database (bad descriptor, unreachable server, support not
    /// compiled in) is logged and file mode is used instead, so a remote
    /// problem never surfaces here. An error is only returned when the file
    /// store itself cannot be opened.
    pub async fn connect(options: ConnectOptions) -> Result<Self> {
        let remote_uri = options
            .remote_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty());

        if let Some(uri) = remote_uri {
            match connect_remote(uri, &options).await {
                Ok(store) => {
                    info!(mode = %StorageMode::Remote, "connected to document database");
                    return Ok(Self::from_store(store, StorageMode::Remote));
                }
                Err(err) => {
                    warn!(error = %err, "document database connect failed, falling back to file store");
                }
            }
        }

        let store = FileStore::open(&options.data_file)?;
        info!(
            mode = %StorageMode::File,
            path = %options.data_file.display(),
            "using file store"
        );
        Ok(Self::from_store(store, StorageMode::File))
    }

    /// Wraps an already-opened store.
    pub fn from_store(store: impl RecordStore, mode: StorageMode) -> Self {
        Self {
            store: Arc::new(store),
            mode,
        }
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Returns every record in the collection.
    ///
    /// File mode returns insertion order, remote mode newest first.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, collection: &str) -> Result<Vec<Record>> {
        self.store.get(collection).await
    }

    /// Adds a record, assigning `id` and `createdAt`.
    #[instrument(level = "debug", skip(self, fields))]
    pub async fn add(&self, collection: &str, fields: Fields) -> Result<Record> {
        self.store.add(collection, fields).await
    }

    /// Returns the first record, in [`Database::get`] order, matching
    /// `predicate`.
    pub async fn find<F>(&self, collection: &str, predicate: F) -> Result<Option<Record>>
    where
        F: Fn(&Record) -> bool,
    {
        let records = self.get(collection).await?;
        Ok(records.into_iter().find(|record| predicate(record)))
    }

    /// Returns every record matching `predicate`, in [`Database::get`] order.
    pub async fn filter<F>(&self, collection: &str, predicate: F) -> Result<Vec<Record>>
    where
        F: Fn(&Record) -> bool,
    {
        let records = self.get(collection).await?;
        Ok(records.into_iter().filter(|record| predicate(record)).collect())
    }

    /// Shallow-merges `patch` into the record with `id`; `None` if absent.
    #[instrument(level = "debug", skip(self, patch))]
    pub async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Option<Record>> {
        self.store.update(collection, id, patch).await
    }

    /// Removes the record with `id`. Removing a missing id is a no-op that
    /// returns `false`.
    #[instrument(level = "debug", skip(self))]
    pub async fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        self.store.remove(collection, id).await
    }
}

#[cfg(feature = "mongo")]
async fn connect_remote(uri: &str, options: &ConnectOptions) -> Result<crate::mongo::MongoStore> {
    crate::mongo::MongoStore::connect(
        uri,
        &options.default_database,
        options.server_selection_timeout,
    )
    .await
}

#[cfg(not(feature = "mongo"))]
async fn connect_remote(_uri: &str, _options: &ConnectOptions) -> Result<FileStore> {
    Err(asan_core::StorageError::Unavailable(
        "document database support is not compiled in".to_string(),
    ))
}
