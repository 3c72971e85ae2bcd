//! Resource API
//!
//! Async facade used by the HTTP layer. Every mutation runs the same pipeline:
//! constraint check, repository commit, memento recording, notification. The
//! constraint check is the only stage that can refuse a write; once the
//! repository has committed, memento and notification failures are logged and
//! the committed resource is still returned.

use crate::binary::{verify_digest, BinaryStore};
use crate::cache::ProfileCache;
use crate::config::LdpConfig;
use crate::constraint::{ConstraintService, LdpConstraints};
use crate::error::LdpError;
use crate::event::{ChangeKind, EventSink, LogEventSink, Notification};
use crate::memento::{FileMementoStore, MementoStore};
use crate::model::InteractionModel;
use crate::rdf::{Dataset, Iri};
use crate::repository::{Commit, ResourceRepository};
use crate::resource::Resource;
use crate::session::{AgentService, DefaultAgentService, Session};
use crate::store::persistence::SledResourceStore;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Service facade over the repository, memento store and event sink
pub struct ResourceApi {
    repository: Arc<ResourceRepository>,
    constraints: Arc<dyn ConstraintService>,
    /// `None` when versioning is disabled.
    mementos: Option<Arc<dyn MementoStore>>,
    events: Arc<dyn EventSink>,
    binaries: Arc<BinaryStore>,
    agents: Arc<dyn AgentService>,
    profiles: Arc<ProfileCache<String, Arc<String>>>,
}

impl ResourceApi {
    pub fn new(
        repository: Arc<ResourceRepository>,
        constraints: Arc<dyn ConstraintService>,
        mementos: Option<Arc<dyn MementoStore>>,
        events: Arc<dyn EventSink>,
        binaries: Arc<BinaryStore>,
        agents: Arc<dyn AgentService>,
        profiles: Arc<ProfileCache<String, Arc<String>>>,
    ) -> Self {
        Self {
            repository,
            constraints,
            mementos,
            events,
            binaries,
            agents,
            profiles,
        }
    }

    /// Open the on-disk stores described by `config` under `workspace_root`.
    ///
    /// Notifications go to the log until another sink is installed with
    /// [`with_event_sink`](Self::with_event_sink).
    pub fn open(config: &LdpConfig, workspace_root: &Path) -> Result<Self, LdpError> {
        config.validate().map_err(|errors| {
            LdpError::ConfigError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        let storage = config.storage.resolve(workspace_root);
        let root = Iri::parse(&config.base_url)?;

        let store = Arc::new(SledResourceStore::new(&storage.store_path)?);
        let repository = Arc::new(ResourceRepository::new(store, root));
        let mementos: Option<Arc<dyn MementoStore>> = if config.versioning.enabled {
            Some(Arc::new(FileMementoStore::new(&storage.mementos_path)))
        } else {
            None
        };
        let binaries = Arc::new(BinaryStore::new(&storage.binaries_path)?);

        debug!(
            base_url = %config.base_url,
            store_path = %storage.store_path.display(),
            versioning = config.versioning.enabled,
            "Opened resource store"
        );
        Ok(Self::new(
            repository,
            Arc::new(LdpConstraints::new()),
            mementos,
            Arc::new(LogEventSink),
            binaries,
            Arc::new(DefaultAgentService::new(config.agent_namespace.clone())),
            Arc::new(ProfileCache::new(config.cache.capacity)),
        ))
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_constraints(mut self, constraints: Arc<dyn ConstraintService>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn repository(&self) -> &Arc<ResourceRepository> {
        &self.repository
    }

    pub fn root(&self) -> &Iri {
        self.repository.root()
    }

    pub fn versioning_enabled(&self) -> bool {
        self.mementos.is_some()
    }

    /// Session for an authenticated principal (`None` is anonymous).
    pub fn session_for(&self, principal: Option<&str>) -> Session {
        Session::new(self.agents.as_agent(principal))
    }

    /// Create the root container if missing.
    pub async fn initialize(&self) -> Result<Option<Resource>, LdpError> {
        let repository = Arc::clone(&self.repository);
        let session = Session::administrator();
        let commit = run_blocking(move || repository.initialize(&session)).await?;
        match commit {
            Some(commit) => Ok(Some(self.finish(commit).await)),
            None => Ok(None),
        }
    }

    pub async fn create(
        &self,
        id: &Iri,
        model: InteractionModel,
        dataset: Dataset,
        session: &Session,
    ) -> Result<Resource, LdpError> {
        self.check_constraints(model, &dataset)?;
        let repository = Arc::clone(&self.repository);
        let (id, session) = (id.clone(), session.clone());
        let commit =
            run_blocking(move || repository.create(&id, model, dataset, &session)).await?;
        Ok(self.finish(commit).await)
    }

    /// Create a NonRDFSource. `digest`, when supplied, must match `content`.
    pub async fn create_binary(
        &self,
        id: &Iri,
        content: Vec<u8>,
        mime_type: Option<String>,
        digest: Option<&str>,
        dataset: Dataset,
        session: &Session,
    ) -> Result<Resource, LdpError> {
        if let Some(digest) = digest {
            verify_digest(&content, digest)?;
        }
        self.check_constraints(InteractionModel::NonRDFSource, &dataset)?;

        let binaries = Arc::clone(&self.binaries);
        let metadata =
            run_blocking(move || Ok(binaries.store(&content, mime_type)?)).await?;
        let repository = Arc::clone(&self.repository);
        let (id, session) = (id.clone(), session.clone());
        let commit =
            run_blocking(move || repository.create_binary(&id, metadata, dataset, &session))
                .await?;
        Ok(self.finish(commit).await)
    }

    /// Replace the user-managed graph. The interaction model never changes.
    pub async fn replace(
        &self,
        id: &Iri,
        dataset: Dataset,
        session: &Session,
    ) -> Result<Resource, LdpError> {
        let model = {
            let repository = Arc::clone(&self.repository);
            let id = id.clone();
            run_blocking(move || repository.require(&id)).await?.interaction_model
        };
        self.check_constraints(model, &dataset)?;
        let repository = Arc::clone(&self.repository);
        let (id, session) = (id.clone(), session.clone());
        let commit =
            run_blocking(move || repository.replace_model(&id, model, dataset, &session)).await?;
        Ok(self.finish(commit).await)
    }

    pub async fn delete(&self, id: &Iri, session: &Session) -> Result<(), LdpError> {
        let repository = Arc::clone(&self.repository);
        let (id, session) = (id.clone(), session.clone());
        let commit = run_blocking(move || repository.delete(&id, &session)).await?;
        self.finish(commit).await;
        Ok(())
    }

    /// Current state; `None` for unknown and deleted resources.
    pub async fn get(&self, id: &Iri) -> Result<Option<Resource>, LdpError> {
        let repository = Arc::clone(&self.repository);
        let id = id.clone();
        run_blocking(move || repository.get(&id)).await
    }

    /// State of `id` as of `at`.
    ///
    /// With versioning disabled only the current state is known, returned when it
    /// was committed at or before `at`.
    pub async fn get_at(&self, id: &Iri, at: DateTime<Utc>) -> Result<Option<Resource>, LdpError> {
        match &self.mementos {
            Some(mementos) => {
                let mementos = Arc::clone(mementos);
                let id = id.clone();
                run_blocking(move || Ok(mementos.get(&id, at)?)).await
            }
            None => Ok(self
                .get(id)
                .await?
                .filter(|resource| resource.modified <= at)),
        }
    }

    /// Recorded memento timestamps, ascending.
    pub async fn mementos(&self, id: &Iri) -> Result<Vec<DateTime<Utc>>, LdpError> {
        let Some(mementos) = &self.mementos else {
            return Ok(Vec::new());
        };
        let mementos = Arc::clone(mementos);
        let id = id.clone();
        run_blocking(move || Ok(mementos.list(&id)?)).await
    }

    /// Remove one memento; `false` when none was recorded at `time`.
    pub async fn delete_memento(&self, id: &Iri, time: DateTime<Utc>) -> Result<bool, LdpError> {
        let Some(mementos) = &self.mementos else {
            return Ok(false);
        };
        let mementos = Arc::clone(mementos);
        let id = id.clone();
        run_blocking(move || Ok(mementos.delete(&id, time)?)).await
    }

    /// Content of a NonRDFSource; `None` for RDF resources.
    pub async fn binary_content(&self, resource: &Resource) -> Result<Option<Vec<u8>>, LdpError> {
        let Some(binary) = &resource.binary else {
            return Ok(None);
        };
        let binaries = Arc::clone(&self.binaries);
        let location = binary.location.clone();
        run_blocking(move || Ok(binaries.get(&location)?)).await
    }

    /// Profile document for `iri`, fetched with `fetch` on a cache miss.
    pub fn profile<F>(&self, iri: &str, fetch: F) -> Result<Arc<String>, LdpError>
    where
        F: FnOnce(&str) -> Result<String, LdpError>,
    {
        self.profiles
            .get_or_populate(&iri.to_string(), |key| fetch(key).map(Arc::new))
    }

    fn check_constraints(&self, model: InteractionModel, dataset: &Dataset) -> Result<(), LdpError> {
        let graph = dataset.user_graph();
        let violations: Vec<_> = self
            .constraints
            .constrained_by(model, &graph, self.root().as_str())
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            debug!(
                model = %model,
                count = violations.len(),
                "Rejected graph with constraint violations"
            );
            Err(LdpError::ConstraintViolations(violations))
        }
    }

    /// Post-commit stages. Failures here are reported, never returned.
    async fn finish(&self, commit: Commit) -> Resource {
        self.record_mementos(&commit).await;
        self.notify(&commit).await;
        commit.resource
    }

    async fn record_mementos(&self, commit: &Commit) {
        let Some(mementos) = &self.mementos else {
            return;
        };
        // A deleted target has no state of its own to keep.
        let snapshots: Vec<Resource> = commit
            .resources()
            .filter(|r| commit.kind != ChangeKind::Deleted || r.identifier != commit.resource.identifier)
            .cloned()
            .collect();
        let mementos = Arc::clone(mementos);
        let outcome = tokio::task::spawn_blocking(move || {
            snapshots
                .iter()
                .filter_map(|resource| {
                    mementos
                        .put(&resource.identifier, resource.modified, resource)
                        .err()
                        .map(|e| (resource.identifier.clone(), e))
                })
                .collect::<Vec<_>>()
        })
        .await;

        match outcome {
            Ok(failures) => {
                for (identifier, err) in failures {
                    error!(identifier = %identifier, error = %err, "Failed to record memento");
                }
            }
            Err(err) => error!(error = %err, "Memento task failed"),
        }
    }

    async fn notify(&self, commit: &Commit) {
        let notifications = commit.resources().map(|resource| {
            let kind = if resource.identifier == commit.resource.identifier {
                commit.kind
            } else {
                ChangeKind::Updated
            };
            Notification::new(
                resource.identifier.clone(),
                resource.interaction_model,
                commit.agent.clone(),
                resource.modified,
                kind,
            )
        });
        let results = join_all(notifications.map(|n| {
            let identifier = n.identifier.clone();
            async move { (identifier, self.events.emit(n).await) }
        }))
        .await;
        for (identifier, result) in results {
            if let Err(err) = result {
                warn!(identifier = %identifier, error = %err, "Failed to emit notification");
            }
        }
    }
}

/// Run blocking repository or filesystem work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, LdpError>
where
    F: FnOnce() -> Result<T, LdpError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LdpError::Internal(format!("Blocking task failed: {}", e)))?
}
