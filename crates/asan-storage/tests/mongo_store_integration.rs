#![cfg(feature = "mongo")]

use asan_core::ManualClock;
use asan_storage::{ConnectOptions, Database, Fields, MongoStore, RecordStore, StorageMode};
use asan_test_infra::mongo::{MongoConfig, MongoServer};
use jiff::SignedDuration;
use serde_json::{json, Value};
use std::time::Duration;

struct Fixture {
    _mongo: MongoServer,
    uri: String,
}

impl Fixture {
    async fn start() -> Self {
        let mongo = MongoServer::new(MongoConfig::builder().build())
            .await
            .expect("start mongo");
        let uri = mongo.uri().await.expect("mongo uri");

        Self { _mongo: mongo, uri }
    }

    async fn store(&self, clock: ManualClock) -> MongoStore<ManualClock> {
        let connected = connect_with_retry(&self.uri).await;
        MongoStore::with_clock(connected.database().clone(), clock)
    }
}

async fn connect_with_retry(uri: &str) -> MongoStore {
    let mut last_error = None;

    for _ in 0..20 {
        match MongoStore::connect(uri, "asan", Some(Duration::from_secs(2))).await {
            Ok(store) => return store,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect mongo: {last_error:?}");
}

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn add_returns_normalized_record() {
    let fixture = Fixture::start().await;
    let store = fixture.store(ManualClock::at_millis(1_000)).await;

    let record = store
        .add(
            "bookings",
            fields(json!({ "pickup": "A", "drop": "B", "id": "ignored" })),
        )
        .await
        .unwrap();

    let id = record.id().unwrap();
    assert_eq!(id.len(), 24, "ObjectId hex expected, got {id}");
    assert_ne!(id, "ignored");
    assert_eq!(record.created_at(), Some(1_000));
    assert!(record.get("_id").is_none());

    let all = store.get("bookings").await.unwrap();
    assert_eq!(all, vec![record]);
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn get_returns_newest_first() {
    let fixture = Fixture::start().await;
    let clock = ManualClock::at_millis(1_000);
    let store = fixture.store(clock.clone()).await;

    store.add("rides", fields(json!({ "n": 1 }))).await.unwrap();
    clock.advance(SignedDuration::from_secs(1));
    store.add("rides", fields(json!({ "n": 2 }))).await.unwrap();
    clock.advance(SignedDuration::from_secs(1));
    let newest = store.add("rides", fields(json!({ "n": 3 }))).await.unwrap();

    let all = store.get("rides").await.unwrap();
    let order: Vec<_> = all.iter().map(|r| r.get("n").cloned()).collect();
    assert_eq!(order, vec![Some(json!(3)), Some(json!(2)), Some(json!(1))]);
    assert_eq!(all.first(), Some(&newest));
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn update_merges_and_protects_identity() {
    let fixture = Fixture::start().await;
    let store = fixture.store(ManualClock::at_millis(5_000)).await;
    let child = store
        .add("children", fields(json!({ "name": "A", "userId": "u1" })))
        .await
        .unwrap();
    let id = child.id().unwrap();

    let updated = store
        .update(
            "children",
            id,
            fields(json!({ "name": "B", "id": "x", "createdAt": 0 })),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id(), Some(id));
    assert_eq!(updated.created_at(), Some(5_000));
    assert_eq!(updated.get_str("name"), Some("B"));
    assert_eq!(updated.get_str("userId"), Some("u1"));
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn missing_ids_are_soft_results() {
    let fixture = Fixture::start().await;
    let store = fixture.store(ManualClock::at_millis(1_000)).await;

    let missing_oid = "65f000000000000000000000";
    assert!(store
        .update("children", missing_oid, fields(json!({ "name": "X" })))
        .await
        .unwrap()
        .is_none());
    assert!(store
        .update("children", "nonexistent-id", fields(json!({ "name": "X" })))
        .await
        .unwrap()
        .is_none());
    assert!(!store.remove("children", "nonexistent-id").await.unwrap());
    assert!(store.get("never-written").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn remove_deletes_once() {
    let fixture = Fixture::start().await;
    let store = fixture.store(ManualClock::at_millis(1_000)).await;
    let contact = store.add("contacts", Fields::new()).await.unwrap();
    let id = contact.id().unwrap();

    assert!(store.remove("contacts", id).await.unwrap());
    assert!(!store.remove("contacts", id).await.unwrap());
    assert!(store.get("contacts").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn database_selects_remote_mode_when_reachable() {
    let fixture = Fixture::start().await;
    // Wait until the server accepts connections before handing over the URI.
    connect_with_retry(&fixture.uri).await;
    let dir = tempfile::TempDir::new().unwrap();

    let db = Database::connect(
        ConnectOptions::builder()
            .data_file(dir.path().join("data.json"))
            .remote_uri(fixture.uri.clone())
            .build(),
    )
    .await
    .unwrap();

    assert_eq!(db.mode(), StorageMode::Remote);
    assert!(!dir.path().join("data.json").exists());

    let record = db.add("users", fields(json!({ "phone": "555" }))).await.unwrap();
    let found = db
        .find("users", |r| r.get_str("phone") == Some("555"))
        .await
        .unwrap();
    assert_eq!(found, Some(record));
}
