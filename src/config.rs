//! Configuration System
//!
//! Layered configuration: built-in defaults, the global user file, workspace
//! files, then `LDP_`-prefixed environment variables. The loaded [`LdpConfig`]
//! is passed explicitly to the components that need it.

use crate::error::LdpError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdpConfig {
    /// Base IRI of the repository; the root container's identifier
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix for agent names that are not already IRIs
    #[serde(default = "default_agent_namespace")]
    pub agent_namespace: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    "trellis:data/".to_string()
}

fn default_agent_namespace() -> String {
    "trellis:agent/".to_string()
}

impl Default for LdpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            agent_namespace: default_agent_namespace(),
            storage: StorageConfig::default(),
            versioning: VersioningConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// On-disk locations, relative to the workspace root unless absolute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_mementos_path")]
    pub mementos_path: PathBuf,

    #[serde(default = "default_binaries_path")]
    pub binaries_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".ldp/store")
}

fn default_mementos_path() -> PathBuf {
    PathBuf::from(".ldp/mementos")
}

fn default_binaries_path() -> PathBuf {
    PathBuf::from(".ldp/binaries")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            mementos_path: default_mementos_path(),
            binaries_path: default_binaries_path(),
        }
    }
}

impl StorageConfig {
    /// Copy with every relative path joined onto `root`.
    pub fn resolve(&self, root: &Path) -> StorageConfig {
        let absolute = |path: &PathBuf| {
            if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            }
        };
        StorageConfig {
            store_path: absolute(&self.store_path),
            mementos_path: absolute(&self.mementos_path),
            binaries_path: absolute(&self.binaries_path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// Record a memento for every committed state
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached profiles
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BaseUrl(String),
    Storage(String),
    Cache(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::BaseUrl(msg) => write!(f, "Base URL: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Cache(msg) => write!(f, "Cache: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl LdpConfig {
    /// Validate the entire configuration, reporting every problem found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = crate::rdf::Iri::parse(&self.base_url) {
            errors.push(ValidationError::BaseUrl(e.to_string()));
        }
        if !self.base_url.ends_with('/') {
            errors.push(ValidationError::BaseUrl(format!(
                "'{}' must end with '/'",
                self.base_url
            )));
        }

        for (name, path) in [
            ("store_path", &self.storage.store_path),
            ("mementos_path", &self.storage.mementos_path),
            ("binaries_path", &self.storage.binaries_path),
        ] {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::Storage(format!("{} cannot be empty", name)));
            }
        }

        if self.cache.capacity == 0 {
            errors.push(ValidationError::Cache(
                "capacity must be greater than zero".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all errors into one [`LdpError::ConfigError`].
    pub fn validated(self) -> Result<Self, LdpError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            LdpError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

/// Loads [`LdpConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults only
    pub fn default() -> LdpConfig {
        LdpConfig::default()
    }

    /// Defaults, global file, workspace files and environment, in increasing precedence.
    pub fn load(workspace_root: &Path) -> Result<LdpConfig, LdpError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder
            .add_source(
                config::Environment::with_prefix("LDP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// A single explicit file layered over the defaults.
    pub fn load_from_file(path: &Path) -> Result<LdpConfig, LdpError> {
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path).required(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Path of the global configuration file, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }
}
