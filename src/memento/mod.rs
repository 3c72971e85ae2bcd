//! Memento Store
//!
//! Append-only history of resource states keyed by identifier and timestamp.
//! Lookup by time returns the latest state recorded at or before the requested
//! instant; instants after the newest memento clamp to it.

pub mod storage;

pub use storage::FileMementoStore;

use crate::error::StorageError;
use crate::rdf::Iri;
use crate::resource::Resource;
use chrono::{DateTime, Utc};

/// Memento Store interface
pub trait MementoStore: Send + Sync {
    /// Record `resource` as the state of `id` at `time`. Rewriting an existing
    /// timestamp replaces that memento.
    fn put(&self, id: &Iri, time: DateTime<Utc>, resource: &Resource) -> Result<(), StorageError>;

    /// Recorded timestamps in ascending order; empty when `id` has no history.
    fn list(&self, id: &Iri) -> Result<Vec<DateTime<Utc>>, StorageError>;

    /// State of `id` as of `time`.
    fn get(&self, id: &Iri, time: DateTime<Utc>) -> Result<Option<Resource>, StorageError>;

    /// Remove the memento recorded exactly at `time`; `false` if there was none.
    fn delete(&self, id: &Iri, time: DateTime<Utc>) -> Result<bool, StorageError>;
}

/// Greatest timestamp in ascending `times` that is `<= at`.
pub fn select_memento(times: &[DateTime<Utc>], at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match times.binary_search(&at) {
        Ok(idx) => Some(times[idx]),
        Err(0) => None,
        Err(idx) => Some(times[idx - 1]),
    }
}
