//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("base_url", "trellis:data/")?
        .set_default("agent_namespace", "trellis:agent/")?
        .set_default("storage.store_path", ".ldp/store")?
        .set_default("storage.mementos_path", ".ldp/mementos")?
        .set_default("storage.binaries_path", ".ldp/binaries")?
        .set_default("versioning.enabled", true)?
        .set_default("cache.capacity", 100)
}
