//! Resource entity and identifier helpers.

use crate::error::LdpError;
use crate::model::InteractionModel;
use crate::rdf::{Dataset, Graph, GraphName, Iri, Subject};
use crate::vocab::ldp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for the content of a NonRDFSource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryMetadata {
    /// Location of the content in the binary store (`urn:blake3:<hex>`).
    pub location: Iri,
    pub mime_type: Option<String>,
    pub size: u64,
    /// `blake3=<hex>`
    pub digest: String,
}

/// Immutable snapshot of a resource.
///
/// Every mutation produces a new snapshot; the previous one survives only as a
/// memento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub identifier: Iri,
    pub interaction_model: InteractionModel,
    pub dataset: Dataset,
    pub modified: DateTime<Utc>,
    pub binary: Option<BinaryMetadata>,
}

impl Resource {
    pub fn new(
        identifier: Iri,
        interaction_model: InteractionModel,
        dataset: Dataset,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier,
            interaction_model,
            dataset,
            modified,
            binary: None,
        }
    }

    pub fn user_graph(&self) -> Graph {
        self.dataset.user_graph()
    }

    pub fn server_graph(&self) -> Graph {
        self.dataset.server_graph()
    }

    pub fn audit_graph(&self) -> Graph {
        self.dataset
            .graph(&GraphName::audit())
            .cloned()
            .unwrap_or_default()
    }

    /// Children listed by `ldp:contains`, in IRI order.
    pub fn children(&self) -> Vec<Iri> {
        let subject = Subject::from(self.identifier.clone());
        self.dataset
            .graph(&GraphName::server_managed())
            .map(|graph| {
                graph
                    .objects(&subject, ldp::CONTAINS)
                    .filter_map(|term| term.as_iri().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_container(&self) -> bool {
        self.interaction_model.is_container()
    }
}

/// Reject identifiers the repository cannot place in the hierarchy.
pub fn validate_identifier(id: &Iri, root: &Iri) -> Result<(), LdpError> {
    if id == root {
        return Ok(());
    }
    let value = id.as_str();
    let Some(path) = value.strip_prefix(root.as_str()) else {
        return Err(LdpError::MalformedInput(format!(
            "Identifier {} is outside {}",
            id, root
        )));
    };
    if path.contains('#') || path.ends_with('/') || path.split('/').any(str::is_empty) {
        return Err(LdpError::MalformedInput(format!(
            "Identifier {} is not a valid resource path",
            id
        )));
    }
    Ok(())
}

/// The resource whose IRI is the immediate path prefix of `id`, or `None` for the root.
pub fn parent_of(id: &Iri, root: &Iri) -> Result<Option<Iri>, LdpError> {
    validate_identifier(id, root)?;
    if id == root {
        return Ok(None);
    }
    let value = id.as_str();
    let parent = match value.rfind('/') {
        Some(idx) if idx + 1 > root.as_str().len() => Iri::new(&value[..idx]),
        _ => root.clone(),
    };
    Ok(Some(parent))
}

/// The resource that stores triples about `iri` (hash IRIs map to their document).
pub fn base_of(iri: &Iri) -> Iri {
    iri.without_fragment()
}
