//! Revision Assignment Tests
//!
//! Concurrent releases of the same version key must never share a revision.

use sciobj_core::{Revision, Stage, VersionKey};
use sciobj_server::core::{RevisionAssigner, RevisionConfig};
use sciobj_server::{MemoryStore, ReleaseStore};
use std::collections::BTreeSet;
use std::sync::Arc;

const CONCURRENT_RELEASES: u32 = 24;

fn assigner(store: Arc<MemoryStore>) -> Arc<RevisionAssigner> {
    // Each contender loses at most once to every other contender
    Arc::new(RevisionAssigner::new(
        store,
        RevisionConfig {
            max_attempts: CONCURRENT_RELEASES + 1,
        },
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_releases_get_distinct_revisions() {
    let store = Arc::new(MemoryStore::new());
    let assigner = assigner(store.clone());
    let key = VersionKey::new("D1", 2, 1, 0, Stage::Stable);

    let mut handles = Vec::new();
    for i in 0..CONCURRENT_RELEASES {
        let assigner = assigner.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            assigner
                .release(&key, vec![format!("G{}", i)], serde_json::Value::Null)
                .await
        }));
    }

    let mut revisions = BTreeSet::new();
    for handle in handles {
        let entry = handle.await.unwrap().unwrap();
        assert!(revisions.insert(entry.version.revision), "duplicate revision");
    }

    // Revisions are exactly 1..=N
    let expected: BTreeSet<u32> = (1..=CONCURRENT_RELEASES).collect();
    let got: BTreeSet<u32> = revisions.iter().map(Revision::get).collect();
    assert_eq!(got, expected);

    assert_eq!(store.count_by_key(&key).await.unwrap(), CONCURRENT_RELEASES as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_releases_across_keys() {
    let store = Arc::new(MemoryStore::new());
    let assigner = assigner(store.clone());

    let stable = VersionKey::new("D1", 1, 0, 0, Stage::Stable);
    let rc = VersionKey::new("D1", 1, 0, 0, Stage::ReleaseCandidate);

    let mut handles = Vec::new();
    for i in 0..(CONCURRENT_RELEASES / 2) {
        let assigner = assigner.clone();
        let key = if i % 2 == 0 { stable.clone() } else { rc.clone() };
        handles.push(tokio::spawn(async move { assigner.assign_revision(&key).await }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let per_key = u64::from(CONCURRENT_RELEASES / 4);
    assert_eq!(store.count_by_key(&stable).await.unwrap(), per_key);
    assert_eq!(store.count_by_key(&rc).await.unwrap(), per_key);

    let releases = store.list_releases("D1").await.unwrap();
    let stable_revisions: BTreeSet<u32> = releases
        .iter()
        .filter(|r| r.key() == stable)
        .map(|r| r.version.revision.get())
        .collect();
    assert_eq!(stable_revisions, (1..=per_key as u32).collect());
}

#[tokio::test]
async fn test_release_records_object_groups() {
    let store = Arc::new(MemoryStore::new());
    let assigner = assigner(store.clone());
    let key = VersionKey::new("D1", 0, 1, 0, Stage::Beta);

    let entry = assigner
        .release(
            &key,
            vec!["G1".into(), "G2".into()],
            serde_json::json!({ "doi": "10.1234/example" }),
        )
        .await
        .unwrap();

    assert_eq!(entry.version.revision, Revision::FIRST);
    assert_eq!(entry.object_count, 2);
    assert_eq!(entry.metadata["doi"], "10.1234/example");

    let stored = store.get_release(&entry.id).await.unwrap().unwrap();
    assert_eq!(stored, entry);
}
