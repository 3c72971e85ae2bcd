//! Writers on the same identifier are serialized with strictly ordered timestamps.

use crate::integration::test_utils::{iri, open_api, titled};
use ldp_store::concurrency::ResourceLockManager;
use ldp_store::rdf::Dataset;
use ldp_store::{InteractionModel, Session};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const WRITERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_replaces_commit_distinct_states() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(open_api(&temp_dir).await);
    let id = iri("doc");
    let created = api
        .create(&id, InteractionModel::RDFSource, titled(&id, "initial"), &Session::anonymous())
        .await
        .unwrap();

    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let api = Arc::clone(&api);
            let id = id.clone();
            tokio::spawn(async move {
                api.replace(&id, titled(&id, &format!("writer {}", n)), &Session::anonymous())
                    .await
            })
        })
        .collect();

    let mut committed = Vec::new();
    for handle in handles {
        committed.push(handle.await.unwrap().unwrap());
    }

    let timestamps: BTreeSet<_> = committed.iter().map(|r| r.modified).collect();
    assert_eq!(timestamps.len(), WRITERS);
    assert!(timestamps.iter().all(|t| *t > created.modified));

    let last = committed.iter().max_by_key(|r| r.modified).unwrap();
    let current = api.get(&id).await.unwrap().unwrap();
    assert_eq!(current.modified, last.modified);
    assert_eq!(current.user_graph(), last.user_graph());

    let history = api.mementos(&id).await.unwrap();
    assert_eq!(history.len(), WRITERS + 1);
    assert!(history.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_in_one_container() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(open_api(&temp_dir).await);
    let container = iri("c");
    api.create(&container, InteractionModel::BasicContainer, Dataset::new(), &Session::anonymous())
        .await
        .unwrap();

    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let api = Arc::clone(&api);
            tokio::spawn(async move {
                let id = iri(&format!("c/child{}", n));
                api.create(&id, InteractionModel::RDFSource, Dataset::new(), &Session::anonymous())
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // No containment triple lost to an interleaved parent rewrite.
    let parent = api.get(&container).await.unwrap().unwrap();
    assert_eq!(parent.children().len(), WRITERS);
}

#[test]
fn test_overlapping_lock_sets_wait_for_release() {
    let manager = Arc::new(ResourceLockManager::new());
    let first = manager.lock_all(vec![iri("a"), iri("shared-parent-a")]);
    let disjoint = manager.lock_all(vec![iri("b"), iri("shared-parent-b")]);
    assert!(disjoint.covers(&iri("b")));

    let acquired = Arc::new(AtomicBool::new(false));
    let waiter = {
        let manager = Arc::clone(&manager);
        let acquired = Arc::clone(&acquired);
        thread::spawn(move || {
            let _guard = manager.lock_all(vec![iri("a")]);
            acquired.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(20));
    assert!(!acquired.load(Ordering::SeqCst));
    drop(first);
    waiter.join().unwrap();
    assert!(acquired.load(Ordering::SeqCst));
}
