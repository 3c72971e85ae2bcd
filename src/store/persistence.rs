//! Persistence layer for the Resource Store

use crate::error::StorageError;
use crate::rdf::Iri;
use crate::store::{ResourceStore, StoredResource};
use std::path::Path;

/// Sled-based implementation of ResourceStore
///
/// Keys are identifier bytes; values are bincode-encoded [`StoredResource`]s.
pub struct SledResourceStore {
    db: sled::Db,
}

impl SledResourceStore {
    /// Open (or create) a database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| StorageError::backend("open sled database", e))?;
        Ok(Self { db })
    }

    /// Flush all pending writes to disk
    #[cfg(test)]
    fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| StorageError::backend("flush database", e))?;
        Ok(())
    }

    fn encode(record: &StoredResource) -> Result<Vec<u8>, StorageError> {
        bincode::serialize(record).map_err(|e| StorageError::codec("serialize resource", e))
    }

    fn decode(bytes: &[u8]) -> Result<StoredResource, StorageError> {
        bincode::deserialize(bytes).map_err(|e| StorageError::codec("deserialize resource", e))
    }
}

impl ResourceStore for SledResourceStore {
    fn get(&self, id: &Iri) -> Result<Option<StoredResource>, StorageError> {
        match self
            .db
            .get(id.as_str().as_bytes())
            .map_err(|e| StorageError::backend("get resource", e))?
        {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            None => Ok(None),
        }
    }

    fn put_batch(&self, records: &[StoredResource]) -> Result<(), StorageError> {
        let mut batch = sled::Batch::default();
        for record in records {
            batch.insert(record.identifier().as_str().as_bytes(), Self::encode(record)?);
        }
        self.db
            .apply_batch(batch)
            .map_err(|e| StorageError::backend("apply batch", e))?;
        Ok(())
    }
}
