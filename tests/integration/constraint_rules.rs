//! Constraint engine rules observed through the public API.

use crate::integration::test_utils::{graph, iri, open_api, triple};
use ldp_store::constraint::{ConstraintKind, ConstraintService, ConstraintViolation, LdpConstraints};
use ldp_store::rdf::{Graph, Iri, Literal};
use ldp_store::vocab::{acl, ldp, trellis};
use ldp_store::{InteractionModel, LdpError, Session};
use tempfile::TempDir;

const DOMAIN: &str = "trellis:data/";

fn violations(model: InteractionModel, graph: &Graph) -> Vec<ConstraintViolation> {
    LdpConstraints::new()
        .constrained_by(model, graph, DOMAIN)
        .collect()
}

fn kinds(violations: &[ConstraintViolation]) -> Vec<ConstraintKind> {
    let mut kinds: Vec<_> = violations.iter().map(|v| v.kind).collect();
    kinds.sort_by_key(|k| k.as_str());
    kinds.dedup();
    kinds
}

#[test]
fn test_server_managed_properties_rejected_for_every_model() {
    let id = iri("r");
    let contains = triple(&id, ldp::CONTAINS, iri("r/child"));
    let acl_link = triple(&id, acl::ACCESS_CONTROL, iri("r/acl"));
    let g = graph(vec![contains.clone(), acl_link.clone()]);

    for model in InteractionModel::ALL {
        let found = violations(model, &g);
        for cited in [&contains, &acl_link] {
            assert!(
                found
                    .iter()
                    .any(|v| v.kind == ConstraintKind::InvalidProperty && v.contains(cited)),
                "{:?} should cite {}",
                model,
                cited
            );
        }
    }
}

#[test]
fn test_membership_cardinality() {
    let id = iri("dc");
    let two_resources = graph(vec![
        triple(&id, ldp::MEMBERSHIP_RESOURCE, iri("m1")),
        triple(&id, ldp::MEMBERSHIP_RESOURCE, iri("m2")),
        triple(&id, ldp::HAS_MEMBER_RELATION, Iri::new(ldp::MEMBER)),
    ]);
    let none = graph(vec![triple(&id, ldp::HAS_MEMBER_RELATION, Iri::new(ldp::MEMBER))]);
    let both_relations = graph(vec![
        triple(&id, ldp::MEMBERSHIP_RESOURCE, iri("m")),
        triple(&id, ldp::HAS_MEMBER_RELATION, Iri::new(ldp::MEMBER)),
        triple(&id, ldp::IS_MEMBER_OF_RELATION, Iri::new(ldp::MEMBER)),
    ]);

    for model in [InteractionModel::DirectContainer, InteractionModel::IndirectContainer] {
        for g in [&two_resources, &none, &both_relations] {
            assert!(kinds(&violations(model, g)).contains(&ConstraintKind::InvalidCardinality));
        }
    }
}

#[test]
fn test_membership_vocabulary_outside_membership_containers() {
    let id = iri("r");
    let g = graph(vec![triple(&id, ldp::HAS_MEMBER_RELATION, Iri::new(ldp::MEMBER))]);
    for model in [
        InteractionModel::RDFSource,
        InteractionModel::NonRDFSource,
        InteractionModel::Container,
        InteractionModel::BasicContainer,
    ] {
        assert_eq!(kinds(&violations(model, &g)), vec![ConstraintKind::InvalidProperty]);
    }
}

#[test]
fn test_range_checks() {
    let id = iri("dc");
    let g = graph(vec![
        triple(&id, ldp::MEMBERSHIP_RESOURCE, iri("m")),
        triple(&id, ldp::HAS_MEMBER_RELATION, Iri::new(ldp::CONTAINS)),
        triple(&id, ldp::INBOX, Literal::simple("not an IRI")),
    ]);
    let found = violations(InteractionModel::DirectContainer, &g);
    let range: Vec<_> = found
        .iter()
        .filter(|v| v.kind == ConstraintKind::InvalidRange)
        .collect();
    assert!(range.iter().any(|v| v.triples.iter().any(|t| t.predicate == ldp::INBOX)));
    assert!(range
        .iter()
        .any(|v| v.triples.iter().any(|t| t.predicate == ldp::HAS_MEMBER_RELATION)));
}

#[test]
fn test_extra_types_are_accepted() {
    let id = iri("r");
    let g = graph(vec![triple(
        &id,
        ldp_store::vocab::rdf::TYPE,
        Iri::new("http://example.org/Custom"),
    )]);
    for model in InteractionModel::ALL
        .into_iter()
        .filter(|m| !m.is_membership_container())
    {
        assert!(violations(model, &g).is_empty(), "{:?}", model);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_all_violations_reported_and_nothing_written() {
    let temp_dir = TempDir::new().unwrap();
    let api = open_api(&temp_dir).await;
    let id = iri("dc");
    let data = ldp_store::rdf::Dataset::from_user_graph(graph(vec![
        triple(&id, ldp::CONTAINS, iri("dc/x")),
        triple(&id, ldp::INSERTED_CONTENT_RELATION, Iri::new(ldp::MEMBER_SUBJECT)),
    ]));

    let err = api
        .create(&id, InteractionModel::DirectContainer, data, &Session::anonymous())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 422);
    let links = err.constrained_by();
    assert!(links.contains(&trellis::INVALID_PROPERTY));
    assert!(links.contains(&trellis::INVALID_CARDINALITY));
    assert!(matches!(err, LdpError::ConstraintViolations(ref v) if v.len() >= 3));
    assert!(api.get(&id).await.unwrap().is_none());
    let root = api.get(api.root()).await.unwrap().unwrap();
    assert!(root.children().is_empty());
}
