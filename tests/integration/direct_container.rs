//! Containment and membership maintained across creates and deletes.

use crate::integration::test_utils::{dataset, iri, open_api, titled, triple};
use ldp_store::rdf::{Iri, Triple};
use ldp_store::vocab::{ldp, rdf};
use ldp_store::{InteractionModel, LdpError, Session};
use tempfile::TempDir;

fn contains(parent: &Iri, child: &Iri) -> Triple {
    Triple::new(parent.clone(), Iri::new(ldp::CONTAINS), child.clone())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_direct_container_membership_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let session = Session::anonymous();

    let c = iri("c");
    let d = iri("c/d");
    let m = iri("c/m");
    let child = iri("c/d/x");

    api.create(&c, InteractionModel::BasicContainer, dataset(vec![]), &session)
        .await
        .unwrap();
    api.create(
        &d,
        InteractionModel::DirectContainer,
        dataset(vec![
            triple(&d, ldp::MEMBERSHIP_RESOURCE, m.clone()),
            triple(&d, ldp::HAS_MEMBER_RELATION, Iri::new(ldp::MEMBER)),
        ]),
        &session,
    )
    .await
    .unwrap();
    api.create(&m, InteractionModel::RDFSource, titled(&m, "members"), &session)
        .await
        .unwrap();

    api.create(&child, InteractionModel::RDFSource, titled(&child, "x"), &session)
        .await
        .unwrap();

    let member = Triple::new(m.clone(), Iri::new(ldp::MEMBER), child.clone());
    let membership = api.get(&m).await.unwrap().unwrap();
    assert!(membership.server_graph().contains(&member));
    let container = api.get(&d).await.unwrap().unwrap();
    assert!(container.server_graph().contains(&contains(&d, &child)));
    let grandparent = api.get(&c).await.unwrap().unwrap();
    assert!(grandparent.server_graph().contains(&contains(&c, &d)));
    assert!(grandparent.server_graph().contains(&contains(&c, &m)));

    api.delete(&child, &session).await.unwrap();

    let after = api.get(&m).await.unwrap().unwrap();
    assert!(!after.server_graph().contains(&member));
    assert!(after.modified > membership.modified);
    assert_eq!(after.user_graph(), membership.user_graph());
    let container = api.get(&d).await.unwrap().unwrap();
    assert!(!container.server_graph().contains(&contains(&d, &child)));
    assert!(api.get(&child).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_round_trip_preserves_user_graph_and_model() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;

    for (path, model) in [
        ("rdf", InteractionModel::RDFSource),
        ("container", InteractionModel::Container),
        ("basic", InteractionModel::BasicContainer),
    ] {
        let id = iri(path);
        let data = dataset(vec![
            triple(&id, "http://purl.org/dc/terms/title", ldp_store::rdf::Literal::simple(path)),
            triple(&id, rdf::TYPE, Iri::new("http://example.org/Thing")),
        ]);
        let created = api.create(&id, model, data.clone(), &Session::anonymous()).await.unwrap();
        let fetched = api.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.user_graph(), data.user_graph());
        assert_eq!(fetched.interaction_model, model);
        assert_eq!(fetched.modified, created.modified);
        assert!(fetched
            .server_graph()
            .contains(&Triple::new(id.clone(), Iri::new(rdf::TYPE), model.iri())));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_indirect_container_uses_inserted_content() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let session = Session::anonymous();
    let topic = "http://xmlns.com/foaf/0.1/primaryTopic";

    let list = iri("list");
    api.create(
        &list,
        InteractionModel::IndirectContainer,
        dataset(vec![
            triple(&list, ldp::MEMBERSHIP_RESOURCE, Iri::new("trellis:data/list#it")),
            triple(&list, ldp::HAS_MEMBER_RELATION, Iri::new("http://example.org/item")),
            triple(&list, ldp::INSERTED_CONTENT_RELATION, Iri::new(topic)),
        ]),
        &session,
    )
    .await
    .unwrap();

    let entry = iri("list/entry");
    api.create(
        &entry,
        InteractionModel::RDFSource,
        dataset(vec![triple(&entry, topic, Iri::new("http://example.org/book"))]),
        &session,
    )
    .await
    .unwrap();

    let member = Triple::new(
        Iri::new("trellis:data/list#it"),
        Iri::new("http://example.org/item"),
        Iri::new("http://example.org/book"),
    );
    let container = api.get(&list).await.unwrap().unwrap();
    assert!(container.server_graph().contains(&member));

    api.replace(
        &entry,
        dataset(vec![triple(&entry, topic, Iri::new("http://example.org/film"))]),
        &session,
    )
    .await
    .unwrap();
    let container = api.get(&list).await.unwrap().unwrap();
    assert!(!container.server_graph().contains(&member));
    assert!(container.server_graph().contains(&Triple::new(
        Iri::new("trellis:data/list#it"),
        Iri::new("http://example.org/item"),
        Iri::new("http://example.org/film"),
    )));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shared_member_survives_until_last_contributor_leaves() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let session = Session::anonymous();
    let topic = "http://xmlns.com/foaf/0.1/primaryTopic";
    let book = Iri::new("http://example.org/book");

    let list = iri("list");
    api.create(
        &list,
        InteractionModel::IndirectContainer,
        dataset(vec![
            triple(&list, ldp::MEMBERSHIP_RESOURCE, Iri::new("trellis:data/list#it")),
            triple(&list, ldp::HAS_MEMBER_RELATION, Iri::new("http://example.org/item")),
            triple(&list, ldp::INSERTED_CONTENT_RELATION, Iri::new(topic)),
        ]),
        &session,
    )
    .await
    .unwrap();

    let a = iri("list/a");
    let b = iri("list/b");
    for child in [&a, &b] {
        api.create(
            child,
            InteractionModel::RDFSource,
            dataset(vec![triple(child, topic, book.clone())]),
            &session,
        )
        .await
        .unwrap();
    }

    let member = Triple::new(
        Iri::new("trellis:data/list#it"),
        Iri::new("http://example.org/item"),
        book.clone(),
    );
    let has_member = |resource: &ldp_store::resource::Resource| {
        resource.server_graph().contains(&member)
    };

    // b moves to another topic; a still supplies the book.
    api.replace(
        &b,
        dataset(vec![triple(&b, topic, Iri::new("http://example.org/film"))]),
        &session,
    )
    .await
    .unwrap();
    assert!(has_member(&api.get(&list).await.unwrap().unwrap()));

    // Back on the book, then a leaves; b still supplies it.
    api.replace(&b, dataset(vec![triple(&b, topic, book.clone())]), &session)
        .await
        .unwrap();
    api.delete(&a, &session).await.unwrap();
    let container = api.get(&list).await.unwrap().unwrap();
    assert!(has_member(&container));
    assert!(!container.server_graph().contains(&Triple::new(
        Iri::new("trellis:data/list#it"),
        Iri::new("http://example.org/item"),
        Iri::new("http://example.org/film"),
    )));

    api.delete(&b, &session).await.unwrap();
    assert!(!has_member(&api.get(&list).await.unwrap().unwrap()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_errors() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let session = Session::anonymous();

    let doc = iri("doc");
    api.create(&doc, InteractionModel::RDFSource, dataset(vec![]), &session)
        .await
        .unwrap();

    let err = api
        .create(&doc, InteractionModel::RDFSource, dataset(vec![]), &session)
        .await
        .unwrap_err();
    assert!(matches!(err, LdpError::AlreadyExists(_)));

    let err = api
        .create(&iri("doc/child"), InteractionModel::RDFSource, dataset(vec![]), &session)
        .await
        .unwrap_err();
    assert!(matches!(err, LdpError::InvalidParent(_)));

    let err = api
        .create(&iri("missing/child"), InteractionModel::RDFSource, dataset(vec![]), &session)
        .await
        .unwrap_err();
    assert!(matches!(err, LdpError::InvalidParent(_)));

    let err = api
        .replace(&iri("missing"), dataset(vec![]), &session)
        .await
        .unwrap_err();
    assert!(matches!(err, LdpError::NotFound(_)));

    let err = api.delete(api.root(), &session).await.unwrap_err();
    assert!(matches!(err, LdpError::Conflict(_)));
}
