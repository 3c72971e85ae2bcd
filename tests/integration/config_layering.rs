//! Layered configuration: defaults, global file, workspace files.

use crate::integration::test_utils::with_isolated_home;
use ldp_store::config::{ConfigLoader, LdpConfig};
use ldp_store::ResourceApi;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(path: PathBuf, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();

    let config = with_isolated_home(&test_dir, |_| ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config, LdpConfig::default());
}

#[test]
fn test_environment_file_overrides_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write(
        workspace.join("config/config.toml"),
        "base_url = \"http://localhost/base/\"\n[cache]\ncapacity = 10\n",
    );
    write(workspace.join("config/staging.toml"), "[cache]\ncapacity = 20\n");

    let config = with_isolated_home(&test_dir, |home| {
        write(
            home.join(".config/ldp-store/config.toml"),
            "agent_namespace = \"http://localhost/agents/\"\n[versioning]\nenabled = false\n",
        );
        std::env::set_var("LDP_ENV", "staging");
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.base_url, "http://localhost/base/");
    assert_eq!(config.agent_namespace, "http://localhost/agents/");
    assert_eq!(config.cache.capacity, 20);
    assert!(!config.versioning.enabled);
}

#[test]
fn test_storage_paths_resolve_against_workspace() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write(
        workspace.join("config/config.toml"),
        "[storage]\nstore_path = \"data/store\"\n",
    );

    let config = with_isolated_home(&test_dir, |_| ConfigLoader::load(&workspace).unwrap());
    let resolved = config.storage.resolve(&workspace);
    assert_eq!(resolved.store_path, workspace.join("data/store"));
    assert_eq!(resolved.mementos_path, workspace.join(".ldp/mementos"));

    ResourceApi::open(&config, &workspace).unwrap();
    assert!(workspace.join("data/store").exists());
    assert!(workspace.join(".ldp/binaries").exists());
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let mut config = LdpConfig::default();
    config.base_url = "no-trailing-slash:x".to_string();
    config.cache.capacity = 0;

    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(ResourceApi::open(&config, test_dir.path()).is_err());
}
