//! LDP Constraint Engine
//!
//! Validates the user-managed graph a client wants to write against the LDP
//! shape rules for an interaction model. Evaluation is pure and lazy: the
//! returned iterator yields every violation (not just the first), and an empty
//! iterator means the graph may be persisted.

use crate::model::InteractionModel;
use crate::rdf::{Graph, Triple};
use crate::vocab::{acl, ldp, oa, rdf, trellis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Properties clients may never set; the server owns them.
const SERVER_MANAGED_PROPERTIES: [&str; 2] = [ldp::CONTAINS, acl::ACCESS_CONTROL];

/// Membership vocabulary, only meaningful on direct and indirect containers.
const MEMBERSHIP_PROPERTIES: [&str; 4] = [
    ldp::MEMBERSHIP_RESOURCE,
    ldp::HAS_MEMBER_RELATION,
    ldp::IS_MEMBER_OF_RELATION,
    ldp::INSERTED_CONTENT_RELATION,
];

/// Properties whose object must be an IRI. Each is single-valued.
const URI_RANGE_PROPERTIES: [&str; 6] = [
    ldp::MEMBERSHIP_RESOURCE,
    ldp::HAS_MEMBER_RELATION,
    ldp::IS_MEMBER_OF_RELATION,
    ldp::INBOX,
    ldp::INSERTED_CONTENT_RELATION,
    oa::ANNOTATION_SERVICE,
];

/// Kind of rule a violation breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    InvalidType,
    InvalidProperty,
    InvalidRange,
    InvalidCardinality,
}

impl ConstraintKind {
    /// Constraint IRI advertised to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::InvalidType => trellis::INVALID_TYPE,
            ConstraintKind::InvalidProperty => trellis::INVALID_PROPERTY,
            ConstraintKind::InvalidRange => trellis::INVALID_RANGE,
            ConstraintKind::InvalidCardinality => trellis::INVALID_CARDINALITY,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::InvalidType => "InvalidType",
            ConstraintKind::InvalidProperty => "InvalidProperty",
            ConstraintKind::InvalidRange => "InvalidRange",
            ConstraintKind::InvalidCardinality => "InvalidCardinality",
        };
        f.write_str(name)
    }
}

/// A broken rule together with the triples that break it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub triples: Vec<Triple>,
}

impl ConstraintViolation {
    /// Triples are kept sorted and deduplicated.
    pub fn new(kind: ConstraintKind, mut triples: Vec<Triple>) -> Self {
        triples.sort();
        triples.dedup();
        Self { kind, triples }
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.binary_search(triple).is_ok()
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} triples)", self.kind, self.triples.len())
    }
}

/// Validation seam consumed before any write
pub trait ConstraintService: Send + Sync {
    /// Lazily evaluate `graph` for `model`. `domain` is the repository base IRI;
    /// IRIs outside it are external.
    fn constrained_by<'a>(
        &'a self,
        model: InteractionModel,
        graph: &'a Graph,
        domain: &'a str,
    ) -> Box<dyn Iterator<Item = ConstraintViolation> + 'a>;
}

/// Built-in LDP shape rules
#[derive(Debug, Clone, Copy, Default)]
pub struct LdpConstraints;

impl LdpConstraints {
    pub fn new() -> Self {
        LdpConstraints
    }
}

impl ConstraintService for LdpConstraints {
    fn constrained_by<'a>(
        &'a self,
        model: InteractionModel,
        graph: &'a Graph,
        domain: &'a str,
    ) -> Box<dyn Iterator<Item = ConstraintViolation> + 'a> {
        let cardinality = std::iter::once_with(move || cardinality_violations(model, graph)).flatten();
        let per_triple = graph
            .iter()
            .flat_map(move |triple| triple_violations(model, triple, domain));
        Box::new(cardinality.chain(per_triple))
    }
}

/// Rules evaluated independently on each triple.
fn triple_violations(
    model: InteractionModel,
    triple: &Triple,
    domain: &str,
) -> Vec<ConstraintViolation> {
    let mut out = Vec::new();
    let predicate = triple.predicate.as_str();

    if SERVER_MANAGED_PROPERTIES.contains(&predicate) || !property_allowed(model, predicate) {
        out.push(ConstraintViolation::new(
            ConstraintKind::InvalidProperty,
            vec![triple.clone()],
        ));
    }

    if violates_range(triple, domain) {
        out.push(ConstraintViolation::new(
            ConstraintKind::InvalidRange,
            vec![triple.clone()],
        ));
    }

    // rdf:type assertions are accepted as-is; only their range is checked.
    out
}

fn property_allowed(model: InteractionModel, predicate: &str) -> bool {
    match model {
        InteractionModel::IndirectContainer => true,
        InteractionModel::DirectContainer => predicate != ldp::INSERTED_CONTENT_RELATION,
        InteractionModel::RDFSource
        | InteractionModel::NonRDFSource
        | InteractionModel::Container
        | InteractionModel::BasicContainer => !MEMBERSHIP_PROPERTIES.contains(&predicate),
    }
}

fn violates_range(triple: &Triple, domain: &str) -> bool {
    let predicate = triple.predicate.as_str();

    if (URI_RANGE_PROPERTIES.contains(&predicate) || predicate == rdf::TYPE)
        && !triple.object.is_iri()
    {
        return true;
    }

    match predicate {
        ldp::HAS_MEMBER_RELATION | ldp::IS_MEMBER_OF_RELATION => triple
            .object
            .as_iri()
            .map_or(false, |relation| relation == ldp::CONTAINS),
        ldp::MEMBERSHIP_RESOURCE => triple
            .object
            .as_iri()
            .map_or(false, |target| !target.as_str().starts_with(domain)),
        _ => false,
    }
}

/// Aggregate rules; each violation cites every triple of the offending property.
fn cardinality_violations(model: InteractionModel, graph: &Graph) -> Vec<ConstraintViolation> {
    let mut by_property: BTreeMap<&str, Vec<Triple>> = BTreeMap::new();
    for triple in graph.iter() {
        let predicate = triple.predicate.as_str();
        if URI_RANGE_PROPERTIES.contains(&predicate) {
            by_property.entry(predicate).or_default().push(triple.clone());
        }
    }

    let mut out = Vec::new();
    let take = |property: &str| by_property.get(property).cloned().unwrap_or_default();

    if model.is_membership_container() {
        let resources = take(ldp::MEMBERSHIP_RESOURCE);
        if resources.len() != 1 {
            out.push(ConstraintViolation::new(
                ConstraintKind::InvalidCardinality,
                resources,
            ));
        }

        let mut relations = take(ldp::HAS_MEMBER_RELATION);
        relations.extend(take(ldp::IS_MEMBER_OF_RELATION));
        if relations.len() != 1 {
            out.push(ConstraintViolation::new(
                ConstraintKind::InvalidCardinality,
                relations,
            ));
        }
    }

    for (property, triples) in &by_property {
        let checked_above = model.is_membership_container()
            && matches!(
                *property,
                ldp::MEMBERSHIP_RESOURCE | ldp::HAS_MEMBER_RELATION | ldp::IS_MEMBER_OF_RELATION
            );
        if !checked_above && triples.len() > 1 {
            out.push(ConstraintViolation::new(
                ConstraintKind::InvalidCardinality,
                triples.clone(),
            ));
        }
    }

    out
}
