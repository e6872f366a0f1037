//! Document store persistence and locking behaviour.

mod common;

use std::time::Duration;

use carebase::db::DocumentStore;
use carebase::error::{AppError, StorageError};
use carebase::repo::Patients;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinSet;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Tally {
    count: u32,
    writers: Vec<u32>,
}

#[tokio::test]
async fn save_then_load_round_trips_nested_documents() {
    let (_dir, store) = common::temp_store().await;

    let mut patient = common::patient("p-1");
    patient.health_parameters.history = vec![common::health_check("2024-01-01")];
    patient.health_parameters.last_check = "2024-01-01".parse().ok();
    let document = Patients { patients: vec![patient], ..Default::default() };

    store.save("patients", &document).await.unwrap();
    let loaded: Patients = store.load("patients").await.unwrap();
    assert_eq!(
        serde_json::to_value(&loaded).unwrap(),
        serde_json::to_value(&document).unwrap()
    );

    let value = json!({ "a": [{ "b": { "c": [1, 2, { "d": null }] } }], "e": "f" });
    store.save("freeform", &value).await.unwrap();
    let loaded: serde_json::Value = store.load("freeform").await.unwrap();
    assert_eq!(loaded, value);
}

#[tokio::test]
async fn undecodable_bytes_are_corrupt() {
    let (dir, store) = common::temp_store().await;
    std::fs::write(dir.path().join("patients.json"), b"{ not json").unwrap();

    let err = store.load::<Patients>("patients").await.unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
}

#[tokio::test]
async fn failed_rename_keeps_previous_state_and_cleans_up() {
    let (dir, store) = common::temp_store().await;
    // A non-empty directory where the document belongs cannot be replaced.
    let target = dir.path().join("patients.json");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("keep"), b"previous").unwrap();

    let document = Patients { patients: vec![common::patient("p-1")], ..Default::default() };
    let err = store.save("patients", &document).await.unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));

    assert!(target.is_dir());
    assert_eq!(std::fs::read(target.join("keep")).unwrap(), b"previous");
    let leftovers: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
}

#[tokio::test]
async fn missing_resource_falls_back_to_seed() {
    let data = tempfile::tempdir().unwrap();
    let seeds = tempfile::tempdir().unwrap();
    std::fs::write(
        seeds.path().join("duties.json"),
        r#"{"caregivers":[{"id":"c-1","name":"Ann","duties":[]}]}"#,
    )
    .unwrap();

    let store = DocumentStore::open(data.path(), Some(seeds.path().to_path_buf()))
        .await
        .unwrap();
    let doc: serde_json::Value = store.load("duties").await.unwrap();
    assert_eq!(doc["caregivers"][0]["id"], "c-1");

    // Unseeded resources still start empty.
    let empty: Patients = store.load("patients").await.unwrap();
    assert!(empty.patients.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_are_all_applied() {
    let (_dir, store) = common::temp_store().await;

    let mut set = JoinSet::new();
    for writer in 0..32u32 {
        let store = store.clone();
        set.spawn(async move {
            store
                .with_lock("tally", move |tally: &mut Tally| -> Result<(), AppError> {
                    tally.count += 1;
                    tally.writers.push(writer);
                    Ok(())
                })
                .await
        });
    }
    while let Some(result) = set.join_next().await {
        result.unwrap().unwrap();
    }

    let tally: Tally = store.load("tally").await.unwrap();
    assert_eq!(tally.count, 32);
    let mut writers = tally.writers.clone();
    writers.sort_unstable();
    assert_eq!(writers, (0..32).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unrelated_resources_do_not_block_each_other() {
    let (_dir, store) = common::temp_store().await;

    let slow = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .with_lock("slow", |tally: &mut Tally| -> Result<(), AppError> {
                    std::thread::sleep(Duration::from_millis(600));
                    tally.count += 1;
                    Ok(())
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast = tokio::time::timeout(
        Duration::from_millis(400),
        store.with_lock("fast", |tally: &mut Tally| -> Result<(), AppError> {
            tally.count += 1;
            Ok(())
        }),
    )
    .await;
    assert!(fast.is_ok(), "mutation of another resource waited on the slow lock");

    slow.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn caller_dropped_before_lock_applies_nothing() {
    let (_dir, store) = common::temp_store().await;

    let holder = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .with_lock("tally", |tally: &mut Tally| -> Result<(), AppError> {
                    std::thread::sleep(Duration::from_millis(400));
                    tally.writers.push(1);
                    Ok(())
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        store.with_lock("tally", |tally: &mut Tally| -> Result<(), AppError> {
            tally.writers.push(2);
            Ok(())
        }),
    )
    .await;
    assert!(abandoned.is_err());

    holder.await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let tally: Tally = store.load("tally").await.unwrap();
    assert_eq!(tally.writers, vec![1]);
}
