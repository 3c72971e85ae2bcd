//! Resource Repository
//!
//! Creates, replaces and deletes resources while keeping the server-managed
//! graph of every affected resource consistent: the parent's `ldp:contains`
//! triples, membership triples of direct and indirect containers, and the audit
//! trail. All records a mutation touches are written in one atomic batch.
//!
//! Writers claim every identifier they will rewrite before reading state, so a
//! resource never has more than one writer and readers only observe whole
//! commits.

pub mod membership;

pub use membership::{MemberRelation, MemberTriple, MembershipConfig};

use crate::concurrency::{ResourceLockGuard, ResourceLockManager};
use crate::error::LdpError;
use crate::event::ChangeKind;
use crate::model::InteractionModel;
use crate::rdf::{Dataset, Graph, GraphName, Iri, Literal, ScopeSource, Triple};
use crate::resource::{parent_of, validate_identifier, BinaryMetadata, Resource};
use crate::session::Session;
use crate::store::{ResourceStore, StoredResource};
use crate::vocab::{ldp, prov, rdf, xsd};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lock acquisition is retried when the set of affected resources changes
/// between planning and locking.
const MAX_LOCK_ATTEMPTS: usize = 16;

/// Result of a committed mutation
#[derive(Debug, Clone)]
pub struct Commit {
    pub kind: ChangeKind,
    /// State of the target after the commit (the tombstoned state for deletes).
    pub resource: Resource,
    /// Other resources rewritten by the commit, in identifier order.
    pub touched: Vec<Resource>,
    pub agent: Iri,
}

impl Commit {
    /// Target followed by every other touched resource.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        std::iter::once(&self.resource).chain(self.touched.iter())
    }
}

/// Mutation requested by a caller
enum Operation {
    Create {
        model: InteractionModel,
        user_graph: Graph,
        binary: Option<BinaryMetadata>,
    },
    Replace {
        user_graph: Graph,
        /// Model the graph was validated against, if any.
        expected_model: Option<InteractionModel>,
    },
    Delete,
}

impl Operation {
    fn kind(&self) -> ChangeKind {
        match self {
            Operation::Create { .. } => ChangeKind::Created,
            Operation::Replace { .. } => ChangeKind::Updated,
            Operation::Delete => ChangeKind::Deleted,
        }
    }
}

/// Repository over a [`ResourceStore`]
pub struct ResourceRepository {
    store: Arc<dyn ResourceStore>,
    locks: Arc<ResourceLockManager>,
    /// Blank node scopes for audit activities.
    scopes: ScopeSource,
    root: Iri,
}

impl ResourceRepository {
    pub fn new(store: Arc<dyn ResourceStore>, root: Iri) -> Self {
        Self {
            store,
            locks: Arc::new(ResourceLockManager::new()),
            scopes: ScopeSource::new(),
            root,
        }
    }

    pub fn root(&self) -> &Iri {
        &self.root
    }

    /// Create the root container if it does not exist yet.
    ///
    /// Returns the commit when the root was created, `None` if it was already live.
    pub fn initialize(&self, session: &Session) -> Result<Option<Commit>, LdpError> {
        let _guard = self.locks.lock_all(vec![self.root.clone()]);
        if let Some(existing) = self.store.get(&self.root)? {
            if existing.is_live() {
                return Ok(None);
            }
        }

        let mut tx = Transaction::new(self.store.as_ref());
        let modified = tx.timestamp(&self.root)?;
        let mut dataset = Dataset::new();
        dataset.graph_mut(GraphName::server_managed()).insert(type_triple(
            &self.root,
            InteractionModel::BasicContainer,
        ));
        let mut root = Resource::new(
            self.root.clone(),
            InteractionModel::BasicContainer,
            dataset,
            modified,
        );
        append_audit(&self.scopes, &mut root, ChangeKind::Created, session, modified);
        tx.stage(StoredResource::live(root));
        let commit = tx.commit(&self.root, ChangeKind::Created, session)?;
        debug!(identifier = %self.root, "Initialized root container");
        Ok(Some(commit))
    }

    /// Current state of `id`, or `None` when it never existed or was deleted.
    pub fn get(&self, id: &Iri) -> Result<Option<Resource>, LdpError> {
        Ok(self.store.get(id)?.and_then(StoredResource::into_live))
    }

    /// Current state of `id`, distinguishing deleted (`Gone`) from unknown (`NotFound`).
    pub fn require(&self, id: &Iri) -> Result<Resource, LdpError> {
        match self.store.get(id)? {
            Some(record) if record.is_live() => Ok(record.resource),
            Some(_) => Err(LdpError::Gone(id.clone())),
            None => Err(LdpError::NotFound(id.clone())),
        }
    }

    /// Create an RDF resource. Only the user-managed graph of `dataset` is kept.
    pub fn create(
        &self,
        id: &Iri,
        model: InteractionModel,
        dataset: Dataset,
        session: &Session,
    ) -> Result<Commit, LdpError> {
        if model == InteractionModel::NonRDFSource {
            return Err(LdpError::MalformedInput(format!(
                "NonRDFSource {} requires binary content",
                id
            )));
        }
        self.mutate(
            id,
            Operation::Create {
                model,
                user_graph: dataset.user_graph(),
                binary: None,
            },
            session,
        )
    }

    /// Create a NonRDFSource whose content already sits in the binary store.
    pub fn create_binary(
        &self,
        id: &Iri,
        binary: BinaryMetadata,
        dataset: Dataset,
        session: &Session,
    ) -> Result<Commit, LdpError> {
        self.mutate(
            id,
            Operation::Create {
                model: InteractionModel::NonRDFSource,
                user_graph: dataset.user_graph(),
                binary: Some(binary),
            },
            session,
        )
    }

    /// Replace the user-managed graph of a live resource.
    pub fn replace(&self, id: &Iri, dataset: Dataset, session: &Session) -> Result<Commit, LdpError> {
        self.mutate(
            id,
            Operation::Replace {
                user_graph: dataset.user_graph(),
                expected_model: None,
            },
            session,
        )
    }

    /// Like [`replace`](Self::replace), but fails with `Conflict` unless the
    /// resource still has interaction model `expected` once it is locked.
    pub fn replace_model(
        &self,
        id: &Iri,
        expected: InteractionModel,
        dataset: Dataset,
        session: &Session,
    ) -> Result<Commit, LdpError> {
        self.mutate(
            id,
            Operation::Replace {
                user_graph: dataset.user_graph(),
                expected_model: Some(expected),
            },
            session,
        )
    }

    /// Tombstone a live resource. Children of a deleted container are left in place.
    pub fn delete(&self, id: &Iri, session: &Session) -> Result<Commit, LdpError> {
        if *id == self.root {
            return Err(LdpError::Conflict(format!(
                "The root container {} cannot be deleted",
                id
            )));
        }
        self.mutate(id, Operation::Delete, session)
    }

    fn mutate(&self, id: &Iri, op: Operation, session: &Session) -> Result<Commit, LdpError> {
        validate_identifier(id, &self.root)?;
        if *id == self.root {
            return Err(LdpError::Conflict(format!(
                "The root container {} is managed by the server",
                id
            )));
        }

        let guard = self.acquire(id, &op)?;
        let kind = op.kind();
        let mut tx = Transaction::new(self.store.as_ref());
        match op {
            Operation::Create {
                model,
                user_graph,
                binary,
            } => self.apply_create(&mut tx, id, model, user_graph, binary, session)?,
            Operation::Replace {
                user_graph,
                expected_model,
            } => self.apply_replace(&mut tx, id, user_graph, expected_model, session)?,
            Operation::Delete => self.apply_delete(&mut tx, id, session)?,
        }

        if let Some(unlocked) = tx.staged_ids().into_iter().find(|staged| !guard.covers(staged)) {
            return Err(LdpError::Internal(format!(
                "Write to {} without holding its lock",
                unlocked
            )));
        }
        tx.commit(id, kind, session)
    }

    /// Lock every resource the operation may rewrite.
    fn acquire(&self, id: &Iri, op: &Operation) -> Result<ResourceLockGuard, LdpError> {
        for _ in 0..MAX_LOCK_ATTEMPTS {
            let planned = self.affected(id, op)?;
            let guard = self.locks.lock_all(planned);
            if guard.covers_all(&self.affected(id, op)?) {
                return Ok(guard);
            }
        }
        Err(LdpError::Conflict(format!(
            "Resources related to {} kept changing while acquiring locks",
            id
        )))
    }

    /// Identifiers rewritten by `op` on `id` given the current stored state.
    fn affected(&self, id: &Iri, op: &Operation) -> Result<BTreeSet<Iri>, LdpError> {
        let mut ids = BTreeSet::new();
        ids.insert(id.clone());

        if let Some(parent_id) = parent_of(id, &self.root)? {
            if let Some(parent) = self.get(&parent_id)? {
                if let Some(config) = MembershipConfig::from_container(&parent) {
                    ids.insert(config.target());
                    // Siblings are read to decide which member triples survive.
                    if !matches!(op, Operation::Create { .. }) {
                        ids.extend(parent.children());
                    }
                }
            }
            ids.insert(parent_id);
        }

        if let Operation::Replace { user_graph, .. } = op {
            if let Some(current) = self.get(id)? {
                let mut proposed = current.clone();
                proposed.dataset.set_graph(GraphName::user_managed(), user_graph.clone());
                let configs = [
                    MembershipConfig::from_container(&current),
                    MembershipConfig::from_container(&proposed),
                ];
                for config in configs.iter().flatten() {
                    ids.insert(config.target());
                }
                if configs.iter().any(Option::is_some) {
                    ids.extend(current.children());
                }
            }
        }

        Ok(ids)
    }

    fn apply_create(
        &self,
        tx: &mut Transaction<'_>,
        id: &Iri,
        model: InteractionModel,
        user_graph: Graph,
        binary: Option<BinaryMetadata>,
        session: &Session,
    ) -> Result<(), LdpError> {
        let previous = tx.record(id)?;
        if previous.as_ref().map_or(false, StoredResource::is_live) {
            return Err(LdpError::AlreadyExists(id.clone()));
        }

        let parent_id = parent_of(id, &self.root)?
            .ok_or_else(|| LdpError::Conflict(format!("{} has no parent", id)))?;
        let parent = match tx.live(&parent_id)? {
            Some(parent) if parent.is_container() => parent,
            _ => return Err(LdpError::InvalidParent(parent_id)),
        };

        let modified = tx.timestamp(id)?;
        let mut dataset = Dataset::from_user_graph(user_graph);
        dataset
            .graph_mut(GraphName::server_managed())
            .insert(type_triple(id, model));
        if let Some(audit) = previous.and_then(|p| p.resource.dataset.graph(&GraphName::audit()).cloned()) {
            dataset.set_graph(GraphName::audit(), audit);
        }
        let mut resource = Resource::new(id.clone(), model, dataset, modified);
        resource.binary = binary;
        append_audit(&self.scopes, &mut resource, ChangeKind::Created, session, modified);
        tx.stage(StoredResource::live(resource.clone()));

        tx.update_live(&parent_id, |parent| {
            parent
                .dataset
                .graph_mut(GraphName::server_managed())
                .insert(Triple::new(parent_id.clone(), Iri::new(ldp::CONTAINS), id.clone()));
        })?;

        if let Some(config) = MembershipConfig::from_container(&parent) {
            add_member_triples(tx, &config, &resource)?;
        }

        Ok(())
    }

    fn apply_replace(
        &self,
        tx: &mut Transaction<'_>,
        id: &Iri,
        user_graph: Graph,
        expected_model: Option<InteractionModel>,
        session: &Session,
    ) -> Result<(), LdpError> {
        let current = match tx.record(id)? {
            Some(record) if record.is_live() => record.resource,
            Some(_) => return Err(LdpError::Gone(id.clone())),
            None => return Err(LdpError::NotFound(id.clone())),
        };
        if let Some(expected) = expected_model {
            if current.interaction_model != expected {
                return Err(LdpError::Conflict(format!(
                    "{} is now a {}, not the {} its graph was checked against",
                    id, current.interaction_model, expected
                )));
            }
        }

        let modified = tx.timestamp(id)?;
        let mut updated = current.clone();
        updated.dataset.set_graph(GraphName::user_managed(), user_graph);
        updated.modified = modified;
        append_audit(&self.scopes, &mut updated, ChangeKind::Updated, session, modified);
        tx.stage(StoredResource::live(updated.clone()));

        // Members contributed by this resource to its parent's membership resource.
        if let Some(parent_id) = parent_of(id, &self.root)? {
            if let Some(parent) = tx.live(&parent_id)? {
                if let Some(config) = MembershipConfig::from_container(&parent) {
                    let before = config.member_triples(&current);
                    let after = config.member_triples(&updated);
                    if before != after {
                        let dropped: Vec<MemberTriple> = before
                            .into_iter()
                            .filter(|member| !after.contains(member))
                            .collect();
                        retract_member_triples(tx, &config, &parent, id, &dropped)?;
                        add_triples(tx, &after)?;
                    }
                }
            }
        }

        // Membership maintained by this container, when its configuration changed.
        let old_config = MembershipConfig::from_container(&current);
        let new_config = MembershipConfig::from_container(&updated);
        if old_config != new_config {
            let mut children = Vec::new();
            for child_id in current.children() {
                if let Some(child) = tx.live(&child_id)? {
                    children.push(child);
                }
            }
            // Every child leaves the old configuration before any joins the new one.
            if let Some(config) = &old_config {
                for child in &children {
                    remove_triples(tx, &config.member_triples(child))?;
                }
            }
            if let Some(config) = &new_config {
                for child in &children {
                    add_member_triples(tx, config, child)?;
                }
            }
        }

        Ok(())
    }

    fn apply_delete(
        &self,
        tx: &mut Transaction<'_>,
        id: &Iri,
        session: &Session,
    ) -> Result<(), LdpError> {
        let current = match tx.record(id)? {
            Some(record) if record.is_live() => record.resource,
            Some(_) => return Err(LdpError::Gone(id.clone())),
            None => return Err(LdpError::NotFound(id.clone())),
        };

        if let Some(parent_id) = parent_of(id, &self.root)? {
            if let Some(parent) = tx.live(&parent_id)? {
                if let Some(config) = MembershipConfig::from_container(&parent) {
                    retract_member_triples(tx, &config, &parent, id, &config.member_triples(&current))?;
                }
            }
            tx.update_live(&parent_id, |parent| {
                parent.dataset.graph_mut(GraphName::server_managed()).remove(&Triple::new(
                    parent_id.clone(),
                    Iri::new(ldp::CONTAINS),
                    id.clone(),
                ));
            })?;
        }

        // Re-read: membership removal may have rewritten the target itself.
        let mut deleted = tx.live(id)?.unwrap_or(current);
        let modified = tx.timestamp(id)?;
        deleted.modified = modified;
        append_audit(&self.scopes, &mut deleted, ChangeKind::Deleted, session, modified);
        tx.stage(StoredResource::tombstone(deleted));

        Ok(())
    }
}

/// Staged writes of one mutation, committed as a single batch.
struct Transaction<'a> {
    store: &'a dyn ResourceStore,
    now: DateTime<Utc>,
    /// Records as read from the store before any change.
    loaded: BTreeMap<Iri, Option<StoredResource>>,
    staged: BTreeMap<Iri, StoredResource>,
}

impl<'a> Transaction<'a> {
    fn new(store: &'a dyn ResourceStore) -> Self {
        Self {
            store,
            now: Utc::now(),
            loaded: BTreeMap::new(),
            staged: BTreeMap::new(),
        }
    }

    fn original(&mut self, id: &Iri) -> Result<Option<StoredResource>, LdpError> {
        if let Some(record) = self.loaded.get(id) {
            return Ok(record.clone());
        }
        let record = self.store.get(id)?;
        self.loaded.insert(id.clone(), record.clone());
        Ok(record)
    }

    /// Latest view of `id`: staged state if any, otherwise the stored record.
    fn record(&mut self, id: &Iri) -> Result<Option<StoredResource>, LdpError> {
        if let Some(record) = self.staged.get(id) {
            return Ok(Some(record.clone()));
        }
        self.original(id)
    }

    fn live(&mut self, id: &Iri) -> Result<Option<Resource>, LdpError> {
        Ok(self.record(id)?.and_then(StoredResource::into_live))
    }

    /// Commit time for `id`: now, or one nanosecond past its previous state.
    fn timestamp(&mut self, id: &Iri) -> Result<DateTime<Utc>, LdpError> {
        let previous = self.original(id)?.map(|r| r.resource.modified);
        Ok(next_timestamp(previous, self.now))
    }

    fn stage(&mut self, record: StoredResource) {
        self.staged.insert(record.identifier().clone(), record);
    }

    /// Apply `change` to `id` if it is live; returns whether it was.
    fn update_live<F>(&mut self, id: &Iri, change: F) -> Result<bool, LdpError>
    where
        F: FnOnce(&mut Resource),
    {
        match self.live(id)? {
            Some(mut resource) => {
                change(&mut resource);
                self.stage(StoredResource::live(resource));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn staged_ids(&self) -> Vec<Iri> {
        self.staged.keys().cloned().collect()
    }

    fn commit(mut self, target: &Iri, kind: ChangeKind, session: &Session) -> Result<Commit, LdpError> {
        let ids = self.staged_ids();
        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            let modified = self.timestamp(id)?;
            if let Some(mut record) = self.staged.remove(id) {
                record.resource.modified = modified;
                if record.tombstoned_at.is_some() {
                    record.tombstoned_at = Some(modified);
                }
                records.push(record);
            }
        }

        self.store.put_batch(&records)?;

        let mut resource = None;
        let mut touched = Vec::new();
        for record in records {
            if record.identifier() == target {
                resource = Some(record.resource);
            } else {
                touched.push(record.resource);
            }
        }
        let resource = resource.ok_or_else(|| {
            LdpError::Internal(format!("Commit for {} did not write the target", target))
        })?;

        debug!(
            identifier = %target,
            kind = ?kind,
            modified = %resource.modified.to_rfc3339_opts(SecondsFormat::Nanos, true),
            touched = touched.len(),
            "Committed resource change"
        );

        Ok(Commit {
            kind,
            resource,
            touched,
            agent: session.agent.clone(),
        })
    }
}

/// Strictly after `previous`, never before `now`.
pub(crate) fn next_timestamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(previous) if previous >= now => previous + Duration::nanoseconds(1),
        _ => now,
    }
}

fn type_triple(id: &Iri, model: InteractionModel) -> Triple {
    Triple::new(id.clone(), Iri::new(rdf::TYPE), model.iri())
}

/// Record `kind` by `session.agent` at `at` in the resource's audit graph.
fn append_audit(
    scopes: &ScopeSource,
    resource: &mut Resource,
    kind: ChangeKind,
    session: &Session,
    at: DateTime<Utc>,
) {
    let mut arena = scopes.arena();
    let activity = arena.fresh();
    let time = Literal::typed(
        at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        Iri::new(xsd::DATE_TIME),
    );
    let audit = resource.dataset.graph_mut(GraphName::audit());
    audit.insert(Triple::new(
        resource.identifier.clone(),
        Iri::new(prov::WAS_GENERATED_BY),
        activity,
    ));
    audit.insert(Triple::new(activity, Iri::new(rdf::TYPE), Iri::new(prov::ACTIVITY)));
    audit.insert(Triple::new(activity, Iri::new(rdf::TYPE), Iri::new(kind.activity_type())));
    audit.insert(Triple::new(
        activity,
        Iri::new(prov::WAS_ASSOCIATED_WITH),
        session.agent.clone(),
    ));
    audit.insert(Triple::new(activity, Iri::new(prov::AT_TIME), time));
}

fn add_member_triples(
    tx: &mut Transaction<'_>,
    config: &MembershipConfig,
    child: &Resource,
) -> Result<(), LdpError> {
    add_triples(tx, &config.member_triples(child))
}

fn add_triples(tx: &mut Transaction<'_>, triples: &[MemberTriple]) -> Result<(), LdpError> {
    for member in triples {
        let written = tx.update_live(&member.holder, |holder| {
            holder
                .dataset
                .graph_mut(GraphName::server_managed())
                .insert(member.triple.clone());
        })?;
        if !written {
            warn!(
                membership_resource = %member.holder,
                triple = %member.triple,
                "Skipping membership triple: membership resource does not exist"
            );
        }
    }
    Ok(())
}

/// Remove those of `triples` that no live child of `container` other than
/// `leaving` still contributes.
fn retract_member_triples(
    tx: &mut Transaction<'_>,
    config: &MembershipConfig,
    container: &Resource,
    leaving: &Iri,
    triples: &[MemberTriple],
) -> Result<(), LdpError> {
    if triples.is_empty() {
        return Ok(());
    }
    let mut supplied = BTreeSet::new();
    for sibling_id in container.children() {
        if sibling_id == *leaving {
            continue;
        }
        if let Some(sibling) = tx.live(&sibling_id)? {
            supplied.extend(config.member_triples(&sibling));
        }
    }
    let orphaned: Vec<MemberTriple> = triples
        .iter()
        .filter(|member| !supplied.contains(*member))
        .cloned()
        .collect();
    remove_triples(tx, &orphaned)
}

fn remove_triples(tx: &mut Transaction<'_>, triples: &[MemberTriple]) -> Result<(), LdpError> {
    for member in triples {
        tx.update_live(&member.holder, |holder| {
            holder
                .dataset
                .graph_mut(GraphName::server_managed())
                .remove(&member.triple);
        })?;
    }
    Ok(())
}
