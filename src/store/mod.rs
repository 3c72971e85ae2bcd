//! Resource Store
//!
//! Persists the current state of each resource, keyed by identifier. Deleted
//! resources keep a tombstoned record so they can be told apart from resources
//! that never existed.

pub mod persistence;

pub use persistence::SledResourceStore;

use crate::error::StorageError;
use crate::rdf::Iri;
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted resource record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResource {
    pub resource: Resource,
    pub tombstoned_at: Option<DateTime<Utc>>,
}

impl StoredResource {
    pub fn live(resource: Resource) -> Self {
        Self {
            resource,
            tombstoned_at: None,
        }
    }

    /// Tombstone recorded at the resource's final `modified` time.
    pub fn tombstone(resource: Resource) -> Self {
        let at = resource.modified;
        Self {
            resource,
            tombstoned_at: Some(at),
        }
    }

    pub fn is_live(&self) -> bool {
        self.tombstoned_at.is_none()
    }

    pub fn identifier(&self) -> &Iri {
        &self.resource.identifier
    }

    /// The resource, if it has not been deleted.
    pub fn into_live(self) -> Option<Resource> {
        if self.is_live() {
            Some(self.resource)
        } else {
            None
        }
    }
}

/// Resource Store interface
pub trait ResourceStore: Send + Sync {
    fn get(&self, id: &Iri) -> Result<Option<StoredResource>, StorageError>;

    /// Write every record or none of them.
    fn put_batch(&self, records: &[StoredResource]) -> Result<(), StorageError>;
}
