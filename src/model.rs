//! LDP interaction models.

use crate::error::LdpError;
use crate::rdf::Iri;
use crate::vocab::ldp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The LDP resource kind governing constraint rules and containment behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionModel {
    RDFSource,
    NonRDFSource,
    Container,
    BasicContainer,
    DirectContainer,
    IndirectContainer,
}

impl InteractionModel {
    pub const ALL: [InteractionModel; 6] = [
        InteractionModel::RDFSource,
        InteractionModel::NonRDFSource,
        InteractionModel::Container,
        InteractionModel::BasicContainer,
        InteractionModel::DirectContainer,
        InteractionModel::IndirectContainer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionModel::RDFSource => ldp::RDF_SOURCE,
            InteractionModel::NonRDFSource => ldp::NON_RDF_SOURCE,
            InteractionModel::Container => ldp::CONTAINER,
            InteractionModel::BasicContainer => ldp::BASIC_CONTAINER,
            InteractionModel::DirectContainer => ldp::DIRECT_CONTAINER,
            InteractionModel::IndirectContainer => ldp::INDIRECT_CONTAINER,
        }
    }

    pub fn iri(&self) -> Iri {
        Iri::new(self.as_str())
    }

    /// Map an LDP type IRI to a model. `ldp:Resource` is treated as an RDF source.
    pub fn from_iri(iri: &str) -> Result<Self, LdpError> {
        match iri {
            ldp::RDF_SOURCE | ldp::RESOURCE => Ok(InteractionModel::RDFSource),
            ldp::NON_RDF_SOURCE => Ok(InteractionModel::NonRDFSource),
            ldp::CONTAINER => Ok(InteractionModel::Container),
            ldp::BASIC_CONTAINER => Ok(InteractionModel::BasicContainer),
            ldp::DIRECT_CONTAINER => Ok(InteractionModel::DirectContainer),
            ldp::INDIRECT_CONTAINER => Ok(InteractionModel::IndirectContainer),
            other => Err(LdpError::MalformedInput(format!(
                "Unknown interaction model: {}",
                other
            ))),
        }
    }

    /// Whether resources of this model may contain children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            InteractionModel::Container
                | InteractionModel::BasicContainer
                | InteractionModel::DirectContainer
                | InteractionModel::IndirectContainer
        )
    }

    /// Direct and indirect containers maintain membership triples.
    pub fn is_membership_container(&self) -> bool {
        matches!(
            self,
            InteractionModel::DirectContainer | InteractionModel::IndirectContainer
        )
    }
}

impl fmt::Display for InteractionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.as_str().trim_start_matches(ldp::NAMESPACE);
        write!(f, "ldp:{}", name)
    }
}
