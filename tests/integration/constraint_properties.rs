//! Property-based tests for the constraint engine

use ldp_store::constraint::{ConstraintKind, ConstraintService, ConstraintViolation, LdpConstraints};
use ldp_store::rdf::{Graph, Iri, Literal, Term, Triple};
use ldp_store::vocab::{acl, ldp, rdf};
use ldp_store::InteractionModel;
use proptest::prelude::*;

const DOMAIN: &str = "trellis:data/";

fn predicate_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        ldp::CONTAINS,
        acl::ACCESS_CONTROL,
        ldp::MEMBERSHIP_RESOURCE,
        ldp::HAS_MEMBER_RELATION,
        ldp::IS_MEMBER_OF_RELATION,
        ldp::INSERTED_CONTENT_RELATION,
        ldp::INBOX,
        rdf::TYPE,
        "http://purl.org/dc/terms/title",
    ])
}

fn object_strategy() -> impl Strategy<Value = Term> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|p| Term::from(Iri::new(format!("trellis:data/{}", p)))),
        "[a-z]{1,6}".prop_map(|p| Term::from(Iri::new(format!("http://example.org/{}", p)))),
        Just(Term::from(Iri::new(ldp::CONTAINS))),
        "[a-z ]{0,8}".prop_map(|s| Term::from(Literal::simple(s))),
    ]
}

fn graph_strategy() -> impl Strategy<Value = Graph> {
    prop::collection::vec((predicate_strategy(), object_strategy()), 0..8).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(p, o)| Triple::new(Iri::new("trellis:data/r"), Iri::new(p), o))
            .collect()
    })
}

fn model_strategy() -> impl Strategy<Value = InteractionModel> {
    prop::sample::select(InteractionModel::ALL.to_vec())
}

fn evaluate(model: InteractionModel, graph: &Graph) -> Vec<ConstraintViolation> {
    let mut found: Vec<_> = LdpConstraints::new()
        .constrained_by(model, graph, DOMAIN)
        .collect();
    found.sort_by(|a, b| {
        (a.kind.as_str(), &a.triples).cmp(&(b.kind.as_str(), &b.triples))
    });
    found
}

proptest! {
    /// Evaluating the same input twice yields the same violations.
    #[test]
    fn test_violation_reporting_is_idempotent(model in model_strategy(), graph in graph_strategy()) {
        prop_assert_eq!(evaluate(model, &graph), evaluate(model, &graph));
    }

    /// Every containment or access-control triple is cited as an invalid property.
    #[test]
    fn test_server_managed_triples_always_cited(model in model_strategy(), graph in graph_strategy()) {
        let found = evaluate(model, &graph);
        for triple in graph.iter().filter(|t| {
            t.predicate == ldp::CONTAINS || t.predicate == acl::ACCESS_CONTROL
        }) {
            prop_assert!(found
                .iter()
                .any(|v| v.kind == ConstraintKind::InvalidProperty && v.contains(triple)));
        }
    }

    /// Extra type assertions never produce InvalidType.
    #[test]
    fn test_invalid_type_never_reported(model in model_strategy(), graph in graph_strategy()) {
        prop_assert!(evaluate(model, &graph)
            .iter()
            .all(|v| v.kind != ConstraintKind::InvalidType));
    }
}
