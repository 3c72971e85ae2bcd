//! CLI route: single route table and run context. Dispatches to the resource API and output.

use crate::api::ResourceApi;
use crate::cli::output::{format_dataset, format_versions};
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, LdpConfig};
use crate::error::LdpError;
use crate::rdf::Iri;
use crate::session::Session;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::debug;

/// Runtime context for CLI execution: configuration, the resource API and an async runtime.
pub struct RunContext {
    config: LdpConfig,
    api: ResourceApi,
    runtime: tokio::runtime::Runtime,
    workspace_root: PathBuf,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, LdpError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        }
        .validated()?;
        let api = ResourceApi::open(&config, &workspace_root)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| LdpError::Internal(format!("Failed to start runtime: {}", e)))?;

        Ok(Self {
            config,
            api,
            runtime,
            workspace_root,
        })
    }

    pub fn api(&self) -> &ResourceApi {
        &self.api
    }

    pub fn workspace_root(&self) -> &PathBuf {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, LdpError> {
        debug!(command = ?command, "Executing command");
        match command {
            Commands::Init => self.handle_init(),
            Commands::Get { id, at } => self.handle_get(id, at.as_deref()),
            Commands::Versions { id } => self.handle_versions(id),
            Commands::Delete { id } => self.handle_delete(id),
            Commands::DeleteVersion { id, time } => self.handle_delete_version(id, time),
            Commands::Config => self.handle_config(),
        }
    }

    fn handle_init(&self) -> Result<String, LdpError> {
        match self.runtime.block_on(self.api.initialize())? {
            Some(root) => Ok(format!("Initialized root container {}", root.identifier)),
            None => Ok(format!("Root container {} already exists", self.api.root())),
        }
    }

    fn handle_get(&self, id: &str, at: Option<&str>) -> Result<String, LdpError> {
        let id = resolve_identifier(self.api.root(), id)?;
        let resource = match at {
            Some(at) => {
                let at = parse_timestamp(at)?;
                self.runtime.block_on(self.api.get_at(&id, at))?
            }
            None => self.runtime.block_on(self.api.get(&id))?,
        };
        match resource {
            Some(resource) => Ok(format_dataset(&resource)),
            None => match at {
                Some(_) => Err(LdpError::NotFound(id)),
                None => Err(self
                    .api
                    .repository()
                    .require(&id)
                    .err()
                    .unwrap_or(LdpError::NotFound(id))),
            },
        }
    }

    fn handle_versions(&self, id: &str) -> Result<String, LdpError> {
        let id = resolve_identifier(self.api.root(), id)?;
        let times = self.runtime.block_on(self.api.mementos(&id))?;
        Ok(format_versions(id.as_str(), &times))
    }

    fn handle_delete(&self, id: &str) -> Result<String, LdpError> {
        let id = resolve_identifier(self.api.root(), id)?;
        self.runtime
            .block_on(self.api.delete(&id, &Session::administrator()))?;
        Ok(format!("Deleted {}", id))
    }

    fn handle_delete_version(&self, id: &str, time: &str) -> Result<String, LdpError> {
        let id = resolve_identifier(self.api.root(), id)?;
        let time = parse_timestamp(time)?;
        if self.runtime.block_on(self.api.delete_memento(&id, time))? {
            Ok(format!("Removed memento {} of {}", time.to_rfc3339(), id))
        } else {
            Ok(format!("No memento of {} at {}", id, time.to_rfc3339()))
        }
    }

    fn handle_config(&self) -> Result<String, LdpError> {
        toml::to_string_pretty(&self.config)
            .map_err(|e| LdpError::Internal(format!("Failed to render configuration: {}", e)))
    }
}

/// Absolute IRIs are used as given; anything else is a path under `root`.
pub fn resolve_identifier(root: &Iri, input: &str) -> Result<Iri, LdpError> {
    let input = input.trim();
    if input.starts_with(root.as_str()) {
        return Iri::parse(input);
    }
    let path = input.trim_start_matches('/');
    if path.is_empty() {
        return Ok(root.clone());
    }
    if path.contains(':') {
        // Absolute IRI outside the base; repository operations reject it.
        return Iri::parse(path);
    }
    Iri::parse(&format!("{}{}", root, path))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, LdpError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| LdpError::MalformedInput(format!("Invalid timestamp '{}': {}", value, e)))
}
