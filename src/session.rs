//! Session and agent identity.
//!
//! A session carries the acting agent through a single mutating request. It is
//! created by the authentication layer, never persisted, and only surfaces in the
//! audit graph and in notifications.

use crate::rdf::Iri;
use crate::vocab::trellis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acting agent and request start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub agent: Iri,
    pub created: DateTime<Utc>,
}

impl Session {
    pub fn new(agent: Iri) -> Self {
        Self {
            agent,
            created: Utc::now(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Iri::new(trellis::ANONYMOUS_AGENT))
    }

    /// Session for server-internal writes such as root bootstrap.
    pub fn administrator() -> Self {
        Self::new(Iri::new(trellis::ADMINISTRATOR_AGENT))
    }

    pub fn is_anonymous(&self) -> bool {
        self.agent == trellis::ANONYMOUS_AGENT
    }
}

/// Maps an authenticated principal name to an agent IRI
pub trait AgentService: Send + Sync {
    fn as_agent(&self, principal: Option<&str>) -> Iri;
}

/// Absolute IRIs pass through; bare names are resolved against `namespace`.
#[derive(Debug, Clone)]
pub struct DefaultAgentService {
    namespace: String,
}

impl DefaultAgentService {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl AgentService for DefaultAgentService {
    fn as_agent(&self, principal: Option<&str>) -> Iri {
        let principal = match principal.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => return Iri::new(trellis::ANONYMOUS_AGENT),
        };
        match Iri::parse(principal) {
            Ok(iri) => iri,
            Err(_) => Iri::new(format!("{}{}", self.namespace, principal)),
        }
    }
}
