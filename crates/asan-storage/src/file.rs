use asan_core::record::requested_id;
use asan_core::{
    Clock, Fields, Record, RecordStore, Result, StorageError, SystemClock, KNOWN_COLLECTIONS,
};
use asan_generator::{IdGenerator, TimestampGenerator};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace};

/// How many generated ids are tried before giving up on an insert.
const MAX_ID_ATTEMPTS: usize = 16;

/// Collection name to records, in insertion order.
type Collections = BTreeMap<String, Vec<Record>>;

/// A record store kept in memory and mirrored to a single JSON file.
///
/// The whole store is loaded once when opened. Every successful mutation
/// rewrites the entire file (pretty-printed); if that write fails the
/// in-memory change is rolled back and the error is returned, so memory
/// never runs ahead of disk.
///
/// File I/O is synchronous: each mutation writes the file on the calling
/// task while holding the lock.
///
/// Mutations within one process are serialized by a mutex. Nothing guards
/// against a second process writing the same file: the last writer wins.
pub struct FileStore<G = TimestampGenerator, C = SystemClock> {
    path: PathBuf,
    collections: Mutex<Collections>,
    generator: G,
    clock: C,
}

impl FileStore {
    /// Opens the store at `path` with the system clock and timestamp ids.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, TimestampGenerator::new(), SystemClock)
    }
}

impl<G: IdGenerator, C: Clock> FileStore<G, C> {
    /// Opens the store at `path`.
    ///
    /// A missing file is created holding an empty store. A file that does not
    /// parse as a store is logged and overwritten with an empty store; its
    /// previous contents are lost.
    pub fn open_with(path: impl Into<PathBuf>, generator: G, clock: C) -> Result<Self> {
        let path = path.into();
        let collections = load(&path)?;

        Ok(Self {
            path,
            collections: Mutex::new(collections),
            generator,
            clock,
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, collections: &Collections) -> Result<()> {
        save(&self.path, collections)
    }

    fn unique_id(&self, collection: &str, records: &[Record]) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.generator.generate();
            if !contains_id(records, &candidate) {
                return Ok(candidate);
            }
            debug!(collection = %collection, id = %candidate, "generated id collided, retrying");
        }

        Err(StorageError::Conflict(format!(
            "no unique id found in '{collection}' after {MAX_ID_ATTEMPTS} attempts"
        )))
    }
}

fn empty_collections() -> Collections {
    KNOWN_COLLECTIONS
        .iter()
        .map(|name| (name.to_string(), Vec::new()))
        .collect()
}

fn contains_id(records: &[Record], id: &str) -> bool {
    records.iter().any(|record| record.id() == Some(id))
}

fn load(path: &Path) -> Result<Collections> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "data file not found, creating an empty store");
            let collections = empty_collections();
            save(path, &collections)?;
            return Ok(collections);
        }
        Err(err) => return Err(err.into()),
    };

    // Bytes that are not UTF-8 fail here too and take the reinitialize path.
    match serde_json::from_slice::<Collections>(&raw) {
        Ok(collections) => {
            debug!(
                path = %path.display(),
                collections = collections.len(),
                "loaded data file"
            );
            Ok(collections)
        }
        Err(err) => {
            error!(
                path = %path.display(),
                error = %err,
                "failed to parse data file, reinitializing an empty store"
            );
            let collections = empty_collections();
            save(path, &collections)?;
            Ok(collections)
        }
    }
}

/// Rewrites the whole file, going through a sibling temp file so a crash
/// mid-write cannot leave a truncated store behind.
fn save(path: &Path, collections: &Collections) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let json = serde_json::to_string_pretty(collections)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    trace!(path = %path.display(), "data file written");
    Ok(())
}

#[async_trait]
impl<G: IdGenerator, C: Clock> RecordStore for FileStore<G, C> {
    async fn get(&self, collection: &str) -> Result<Vec<Record>> {
        let mut collections = self.collections.lock();
        Ok(collections
            .entry(collection.to_owned())
            .or_default()
            .clone())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Record> {
        let mut collections = self.collections.lock();
        let records = collections.entry(collection.to_owned()).or_default();

        let id = match requested_id(&fields) {
            Some(id) if contains_id(records, id) => {
                return Err(StorageError::Conflict(id.to_owned()));
            }
            Some(id) => id.to_owned(),
            None => self.unique_id(collection, records)?,
        };

        let record = Record::new(id, self.clock.now_millis(), fields);
        records.push(record.clone());

        if let Err(err) = self.persist(&collections) {
            if let Some(records) = collections.get_mut(collection) {
                records.pop();
            }
            return Err(err);
        }

        trace!(collection = %collection, id = ?record.id(), "record added");
        Ok(record)
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Option<Record>> {
        let mut collections = self.collections.lock();
        let records = collections.entry(collection.to_owned()).or_default();

        let Some(index) = records.iter().position(|record| record.id() == Some(id)) else {
            return Ok(None);
        };

        let previous = records[index].clone();
        records[index].merge(patch);
        let updated = records[index].clone();

        if let Err(err) = self.persist(&collections) {
            if let Some(records) = collections.get_mut(collection) {
                records[index] = previous;
            }
            return Err(err);
        }

        trace!(collection = %collection, id = %id, "record updated");
        Ok(Some(updated))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.collections.lock();
        let records = collections.entry(collection.to_owned()).or_default();

        if !contains_id(records, id) {
            return Ok(false);
        }

        let snapshot = records.clone();
        records.retain(|record| record.id() != Some(id));

        if let Err(err) = self.persist(&collections) {
            collections.insert(collection.to_owned(), snapshot);
            return Err(err);
        }

        trace!(collection = %collection, id = %id, "record removed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asan_core::ManualClock;
    use asan_generator::seq::SequentialGenerator;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use tempfile::TempDir;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn data_file(dir: &TempDir) -> PathBuf {
        dir.path().join("data").join("data.json")
    }

    fn open(dir: &TempDir) -> FileStore<SequentialGenerator, ManualClock> {
        FileStore::open_with(
            data_file(dir),
            SequentialGenerator::with_prefix("rec"),
            ManualClock::at_millis(1_000),
        )
        .unwrap()
    }

    fn read_file(dir: &TempDir) -> Value {
        let raw = fs::read_to_string(data_file(dir)).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    /// Hands out a fixed list of ids, in order.
    struct ScriptedGenerator(std::sync::Mutex<VecDeque<&'static str>>);

    impl ScriptedGenerator {
        fn new(ids: &[&'static str]) -> Self {
            Self(std::sync::Mutex::new(ids.iter().copied().collect()))
        }
    }

    impl IdGenerator for ScriptedGenerator {
        fn generate(&self) -> String {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted generator ran out of ids")
                .to_owned()
        }
    }

    #[tokio::test]
    async fn open_creates_file_with_known_collections() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        assert!(store.path().exists());
        let raw = fs::read_to_string(data_file(&dir)).unwrap();
        assert!(raw.contains('\n'), "data file should be pretty-printed");

        let value = read_file(&dir);
        for name in KNOWN_COLLECTIONS {
            assert_eq!(value[name], json!([]), "collection {name} should be empty");
        }
    }

    #[tokio::test]
    async fn add_assigns_id_and_created_at() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let record = store
            .add("bookings", fields(json!({ "pickup": "A", "drop": "B" })))
            .await
            .unwrap();

        assert_eq!(record.id(), Some("rec000000"));
        assert_eq!(record.created_at(), Some(1_000));
        assert_eq!(record.get_str("pickup"), Some("A"));
        assert_eq!(record.get_str("drop"), Some("B"));

        let all = store.get("bookings").await.unwrap();
        assert_eq!(all, vec![record]);
    }

    #[tokio::test]
    async fn add_overwrites_caller_created_at() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let record = store
            .add("users", fields(json!({ "phone": "555", "createdAt": 7 })))
            .await
            .unwrap();

        assert_eq!(record.created_at(), Some(1_000));
    }

    #[tokio::test]
    async fn get_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::at_millis(1_000);
        let store = FileStore::open_with(
            data_file(&dir),
            SequentialGenerator::with_prefix("rec"),
            clock.clone(),
        )
        .unwrap();

        store.add("rides", fields(json!({ "n": 1 }))).await.unwrap();
        clock.advance(jiff::SignedDuration::from_secs(1));
        store.add("rides", fields(json!({ "n": 2 }))).await.unwrap();
        clock.advance(jiff::SignedDuration::from_secs(1));
        let last = store.add("rides", fields(json!({ "n": 3 }))).await.unwrap();

        let all = store.get("rides").await.unwrap();
        let order: Vec<_> = all.iter().map(|r| r.get("n").cloned()).collect();
        assert_eq!(order, vec![Some(json!(1)), Some(json!(2)), Some(json!(3))]);
        assert_eq!(all.last(), Some(&last));
    }

    #[tokio::test]
    async fn caller_supplied_id_is_kept_and_must_be_unique() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let record = store
            .add("presets", fields(json!({ "id": "home", "label": "Home" })))
            .await
            .unwrap();
        assert_eq!(record.id(), Some("home"));

        let err = store
            .add("presets", fields(json!({ "id": "home" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(store.get("presets").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn generated_id_collisions_are_retried() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open_with(
            data_file(&dir),
            ScriptedGenerator::new(&["dup", "dup", "fresh"]),
            ManualClock::at_millis(1_000),
        )
        .unwrap();

        let first = store.add("alerts", Fields::new()).await.unwrap();
        let second = store.add("alerts", Fields::new()).await.unwrap();

        assert_eq!(first.id(), Some("dup"));
        assert_eq!(second.id(), Some("fresh"));
    }

    #[tokio::test]
    async fn update_merges_patch_and_protects_identity() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let child = store
            .add("children", fields(json!({ "name": "A", "userId": "u1" })))
            .await
            .unwrap();
        let id = child.id().unwrap().to_owned();

        let updated = store
            .update(
                "children",
                &id,
                fields(json!({ "name": "B", "id": "hijack", "createdAt": 0 })),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id(), Some(id.as_str()));
        assert_eq!(updated.created_at(), child.created_at());
        assert_eq!(updated.get_str("name"), Some("B"));
        assert_eq!(updated.get_str("userId"), Some("u1"));
        assert_eq!(store.get("children").await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn update_missing_id_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let result = store
            .update("children", "nonexistent-id", fields(json!({ "name": "X" })))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let contact = store.add("contacts", Fields::new()).await.unwrap();
        let id = contact.id().unwrap().to_owned();

        assert!(store.remove("contacts", &id).await.unwrap());
        assert!(store.get("contacts").await.unwrap().is_empty());
        assert!(!store.remove("contacts", &id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_collection_reads_empty_and_persists_on_write() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        assert!(store.get("invoices").await.unwrap().is_empty());
        assert!(read_file(&dir).get("invoices").is_none());

        store.add("invoices", Fields::new()).await.unwrap();
        assert_eq!(read_file(&dir)["invoices"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn reopen_sees_persisted_records() {
        let dir = TempDir::new().unwrap();
        let added = {
            let store = open(&dir);
            let record = store
                .add("vehicles", fields(json!({ "plate": "KA-01" })))
                .await
                .unwrap();
            store
                .update("vehicles", record.id().unwrap(), fields(json!({ "seats": 4 })))
                .await
                .unwrap()
                .unwrap()
        };

        let store = open(&dir);
        assert_eq!(store.get("vehicles").await.unwrap(), vec![added]);
    }

    #[tokio::test]
    async fn corrupt_file_is_reinitialized() {
        let dir = TempDir::new().unwrap();
        let path = data_file(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ this is not json").unwrap();

        let store = open(&dir);

        assert!(store.get("users").await.unwrap().is_empty());
        assert_eq!(read_file(&dir)["users"], json!([]));
    }

    #[tokio::test]
    async fn non_utf8_file_is_reinitialized() {
        let dir = TempDir::new().unwrap();
        let path = data_file(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [0xff, 0xfe, b'{', 0x80]).unwrap();

        let store = open(&dir);

        assert!(store.get("bookings").await.unwrap().is_empty());
        assert_eq!(read_file(&dir)["bookings"], json!([]));
    }

    #[tokio::test]
    async fn failed_write_rolls_back_memory() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let kept = store.add("payments", Fields::new()).await.unwrap();

        // Swap the data directory for a plain file so every write fails.
        let data_dir = data_file(&dir).parent().unwrap().to_path_buf();
        fs::remove_dir_all(&data_dir).unwrap();
        fs::write(&data_dir, "blocker").unwrap();

        let err = store.add("payments", Fields::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));

        let err = store
            .update("payments", kept.id().unwrap(), fields(json!({ "amount": 5 })))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));

        let err = store.remove("payments", kept.id().unwrap()).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));

        assert_eq!(store.get("payments").await.unwrap(), vec![kept]);
    }
}
