use asan_core::{
    sanitize_patch, Clock, Fields, Record, RecordStore, Result, StorageError, SystemClock,
    CREATED_AT_FIELD, ID_FIELD,
};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

/// The document key MongoDB assigns. Never surfaced to callers.
const NATIVE_ID_FIELD: &str = "_id";

/// MongoDB implementation of the record store contract.
///
/// Each collection name maps to the MongoDB collection of the same name.
/// `get` returns records newest first (`createdAt` descending). Record ids
/// are the hex form of the generated `ObjectId`; ids that do not parse as an
/// `ObjectId` are matched as plain strings so lookups on them simply miss.
#[derive(Debug, Clone)]
pub struct MongoStore<C = SystemClock> {
    database: mongodb::Database,
    clock: C,
}

impl MongoStore {
    /// Connects to the deployment described by `uri` and checks that it
    /// answers a `ping` before returning.
    ///
    /// The database named in the URI is used, falling back to
    /// `default_database` when the URI names none.
    pub async fn connect(
        uri: &str,
        default_database: &str,
        server_selection_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut options = ClientOptions::parse(uri).await.map_err(map_mongo_error)?;
        if server_selection_timeout.is_some() {
            options.server_selection_timeout = server_selection_timeout;
        }

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(default_database));

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(map_mongo_error)?;
        debug!(database = %database.name(), "document database answered ping");

        Ok(Self::new(database))
    }
}

impl<C: Clock> MongoStore<C> {
    /// Wraps an already-connected database handle.
    pub fn with_clock(database: mongodb::Database, clock: C) -> Self {
        Self { database, clock }
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &mongodb::Database {
        &self.database
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

impl MongoStore<SystemClock> {
    pub fn new(database: mongodb::Database) -> Self {
        Self::with_clock(database, SystemClock)
    }
}

fn map_mongo_error(err: mongodb::error::Error) -> StorageError {
    let message = err.to_string();
    if message.to_ascii_lowercase().contains("timed out") {
        return StorageError::Timeout(message);
    }

    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => StorageError::Unavailable(message),
        ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
            StorageError::Serialization(message)
        }
        ErrorKind::InvalidResponse { .. } => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

/// Converts a caller id into the native key, when it is one.
fn native_id(id: &str) -> Bson {
    ObjectId::parse_str(id)
        .map(Bson::ObjectId)
        .unwrap_or_else(|_| Bson::String(id.to_owned()))
}

fn native_id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(id) => id,
        other => other.to_string(),
    }
}

fn fields_to_document(fields: &Fields) -> Result<Document> {
    mongodb::bson::to_document(fields).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Normalizes a stored document: `_id` becomes a string `id`, every other
/// value is rendered as relaxed extended JSON.
fn document_to_record(mut document: Document) -> Record {
    let id = document.remove(NATIVE_ID_FIELD).map(native_id_to_string);

    let mut fields: Fields = document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();
    if let Some(id) = id {
        fields.insert(ID_FIELD.to_owned(), Value::String(id));
    }

    Record::from_fields(fields)
}

#[async_trait]
impl<C: Clock> RecordStore for MongoStore<C> {
    async fn get(&self, collection: &str) -> Result<Vec<Record>> {
        let documents: Vec<Document> = self
            .collection(collection)
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;

        trace!(collection = %collection, count = documents.len(), "fetched documents");
        Ok(documents.into_iter().map(document_to_record).collect())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Record> {
        let mut fields = fields;
        fields.remove(ID_FIELD);
        fields.remove(NATIVE_ID_FIELD);

        let created_at = self.clock.now_millis();
        fields.insert(CREATED_AT_FIELD.to_owned(), Value::from(created_at));

        let inserted = self
            .collection(collection)
            .insert_one(fields_to_document(&fields)?)
            .await
            .map_err(map_mongo_error)?;
        let id = native_id_to_string(inserted.inserted_id);

        trace!(collection = %collection, id = %id, "document inserted");
        Ok(Record::new(id, created_at, fields))
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Option<Record>> {
        let patch = sanitize_patch(patch);
        let filter = doc! { "_id": native_id(id) };
        let handle = self.collection(collection);

        // An empty `$set` is rejected by the server.
        if !patch.is_empty() {
            let set = fields_to_document(&patch)?;
            handle
                .update_one(filter.clone(), doc! { "$set": set })
                .await
                .map_err(map_mongo_error)?;
        }

        let updated = handle.find_one(filter).await.map_err(map_mongo_error)?;
        Ok(updated.map(document_to_record))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        let deleted = self
            .collection(collection)
            .delete_one(doc! { "_id": native_id(id) })
            .await
            .map_err(map_mongo_error)?;

        Ok(deleted.deleted_count > 0)
    }
}
