//! Memento recording and time-based lookup through the resource API.

use crate::integration::test_utils::{iri, open_api, titled, DCTERMS_TITLE};
use chrono::Duration;
use ldp_store::binary::BinaryStore;
use ldp_store::cache::ProfileCache;
use ldp_store::constraint::LdpConstraints;
use ldp_store::event::LogEventSink;
use ldp_store::memento::{FileMementoStore, MementoStore};
use ldp_store::rdf::{Dataset, Iri, Term};
use ldp_store::repository::ResourceRepository;
use ldp_store::resource::Resource;
use ldp_store::session::DefaultAgentService;
use ldp_store::store::SledResourceStore;
use ldp_store::{InteractionModel, ResourceApi, Session};
use std::sync::Arc;
use tempfile::TempDir;

fn title_of(resource: &Resource) -> Option<String> {
    resource
        .user_graph()
        .with_predicate(DCTERMS_TITLE)
        .find_map(|t| match &t.object {
            Term::Literal(literal) => Some(literal.lexical().to_string()),
            _ => None,
        })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_versions_are_selected_by_time() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let session = Session::anonymous();
    let id = iri("doc");

    let v1 = api
        .create(&id, InteractionModel::RDFSource, titled(&id, "one"), &session)
        .await
        .unwrap();
    let v2 = api.replace(&id, titled(&id, "two"), &session).await.unwrap();
    let v3 = api.replace(&id, titled(&id, "three"), &session).await.unwrap();

    let times = api.mementos(&id).await.unwrap();
    assert_eq!(times, vec![v1.modified, v2.modified, v3.modified]);

    let before = v1.modified - Duration::nanoseconds(1);
    assert!(api.get_at(&id, before).await.unwrap().is_none());

    let between = v3.modified - Duration::nanoseconds(1);
    let future = v3.modified + Duration::days(3650);
    for (time, expected) in [
        (v1.modified, "one"),
        (v2.modified, "two"),
        (between, "two"),
        (v3.modified, "three"),
        (future, "three"),
    ] {
        let snapshot = api.get_at(&id, time).await.unwrap().unwrap();
        assert_eq!(title_of(&snapshot).as_deref(), Some(expected));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_parent_history_tracks_containment() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let root = api.root().clone();

    let before = api.mementos(&root).await.unwrap();
    assert_eq!(before.len(), 1);

    api.create(&iri("a"), InteractionModel::RDFSource, Dataset::new(), &Session::anonymous())
        .await
        .unwrap();
    let after = api.mementos(&root).await.unwrap();
    assert_eq!(after.len(), 2);

    let original = api.get_at(&root, before[0]).await.unwrap().unwrap();
    assert!(original.children().is_empty());
    let current = api.get_at(&root, after[1]).await.unwrap().unwrap();
    assert_eq!(current.children(), vec![iri("a")]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deleted_resource_keeps_history() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let session = Session::anonymous();
    let id = iri("doc");

    let created = api
        .create(&id, InteractionModel::RDFSource, titled(&id, "one"), &session)
        .await
        .unwrap();
    api.delete(&id, &session).await.unwrap();

    assert!(api.get(&id).await.unwrap().is_none());
    let historical = api.get_at(&id, created.modified).await.unwrap().unwrap();
    assert_eq!(title_of(&historical).as_deref(), Some("one"));

    // Re-creation continues the history after the tombstone.
    let recreated = api
        .create(&id, InteractionModel::RDFSource, titled(&id, "again"), &session)
        .await
        .unwrap();
    assert!(recreated.modified > created.modified);
    assert_eq!(
        api.mementos(&id).await.unwrap(),
        vec![created.modified, recreated.modified]
    );
}

#[test]
fn test_unwritable_memento_store_reports_errors() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("mementos");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = FileMementoStore::new(&blocker);

    let id = iri("doc");
    let resource = Resource::new(
        id.clone(),
        InteractionModel::RDFSource,
        Dataset::new(),
        chrono::Utc::now(),
    );
    assert!(store.put(&id, resource.modified, &resource).is_err());
    assert!(store.list(&id).map_or(true, |times| times.is_empty()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_writes_commit_when_mementos_cannot_be_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("mementos");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let root = Iri::new("trellis:data/");
    let store = SledResourceStore::new(temp_dir.path().join("store")).unwrap();
    let api = ResourceApi::new(
        Arc::new(ResourceRepository::new(Arc::new(store), root)),
        Arc::new(LdpConstraints::new()),
        Some(Arc::new(FileMementoStore::new(&blocker))),
        Arc::new(LogEventSink),
        Arc::new(BinaryStore::new(temp_dir.path().join("binaries")).unwrap()),
        Arc::new(DefaultAgentService::new("trellis:agent/")),
        Arc::new(ProfileCache::new(4)),
    );
    let session = Session::anonymous();
    assert!(api.initialize().await.unwrap().is_some());

    let id = iri("doc");
    let created = api
        .create(&id, InteractionModel::RDFSource, titled(&id, "one"), &session)
        .await
        .unwrap();
    assert_eq!(api.get(&id).await.unwrap().unwrap().modified, created.modified);

    let replaced = api
        .replace(&id, titled(&id, "two"), &session)
        .await
        .unwrap();
    let current = api.get(&id).await.unwrap().unwrap();
    assert_eq!(current.modified, replaced.modified);
    assert_eq!(title_of(&current).as_deref(), Some("two"));

    api.delete(&id, &session).await.unwrap();
    assert!(api.get(&id).await.unwrap().is_none());
    assert!(api.mementos(&id).await.map_or(true, |times| times.is_empty()));
}
