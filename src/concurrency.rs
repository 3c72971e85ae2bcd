//! Per-resource write locks.
//!
//! A mutation touches its target plus the parent and membership resources it
//! rewrites. The whole set is claimed at once, so two writers that share any
//! identifier are serialized while writers on disjoint sets run in parallel.

use crate::rdf::Iri;
use parking_lot::{Condvar, Mutex};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Tracks which identifiers currently have a writer
#[derive(Debug, Default)]
pub struct ResourceLockManager {
    held: Mutex<HashSet<Iri>>,
    released: Condvar,
}

impl ResourceLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until every identifier in `ids` is free, then claim them all.
    pub fn lock_all<I>(self: &Arc<Self>, ids: I) -> ResourceLockGuard
    where
        I: IntoIterator<Item = Iri>,
    {
        let ids: BTreeSet<Iri> = ids.into_iter().collect();
        let mut held = self.held.lock();
        while ids.iter().any(|id| held.contains(id)) {
            self.released.wait(&mut held);
        }
        held.extend(ids.iter().cloned());
        ResourceLockGuard {
            manager: Arc::clone(self),
            ids,
        }
    }

    #[cfg(test)]
    fn is_locked(&self, id: &Iri) -> bool {
        self.held.lock().contains(id)
    }

    fn release(&self, ids: &BTreeSet<Iri>) {
        let mut held = self.held.lock();
        for id in ids {
            held.remove(id);
        }
        drop(held);
        self.released.notify_all();
    }
}

/// Releases its identifiers on drop
#[derive(Debug)]
pub struct ResourceLockGuard {
    manager: Arc<ResourceLockManager>,
    ids: BTreeSet<Iri>,
}

impl ResourceLockGuard {
    pub fn covers(&self, id: &Iri) -> bool {
        self.ids.contains(id)
    }

    /// Whether every identifier in `ids` is held by this guard.
    pub fn covers_all<'a, I>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a Iri>,
    {
        ids.into_iter().all(|id| self.ids.contains(id))
    }
}

impl Drop for ResourceLockGuard {
    fn drop(&mut self) {
        self.manager.release(&self.ids);
    }
}
