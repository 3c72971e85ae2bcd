//! Shared test utilities for integration tests
//!
//! Store setup over temporary directories, graph builders and an environment
//! guard for tests that depend on HOME / XDG_CONFIG_HOME.

use ldp_store::config::LdpConfig;
use ldp_store::rdf::{Dataset, Graph, Iri, Literal, Term, Triple};
use ldp_store::ResourceApi;
use std::sync::Mutex;
use tempfile::TempDir;

pub const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
    ldp_env: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
            ldp_env: std::env::var("LDP_ENV").ok(),
        }
    }

    fn restore(self) {
        restore_var("HOME", self.home);
        restore_var("XDG_CONFIG_HOME", self.xdg_config_home);
        restore_var("LDP_ENV", self.ldp_env);
    }
}

fn restore_var(name: &str, value: Option<String>) {
    match value {
        Some(value) => std::env::set_var(name, value),
        None => std::env::remove_var(name),
    }
}

/// Run `f` with HOME pointed at `{test_dir}/home` and XDG_CONFIG_HOME unset.
///
/// Returns the home directory so tests can place a global config file in it.
pub fn with_isolated_home<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    std::env::set_var("HOME", &home);
    std::env::remove_var("XDG_CONFIG_HOME");
    std::env::remove_var("LDP_ENV");

    let result = f(&home);

    env_state.restore();
    result
}

/// Resource API over fresh stores in `test_dir`, root container initialized.
pub async fn open_api(test_dir: &TempDir) -> ResourceApi {
    let api = ResourceApi::open(&LdpConfig::default(), test_dir.path()).unwrap();
    api.initialize().await.unwrap();
    api
}

pub fn iri(path: &str) -> Iri {
    Iri::new(format!("trellis:data/{}", path))
}

pub fn triple(subject: &Iri, predicate: &str, object: impl Into<Term>) -> Triple {
    Triple::new(subject.clone(), Iri::new(predicate), object)
}

pub fn graph(triples: Vec<Triple>) -> Graph {
    triples.into_iter().collect()
}

pub fn dataset(triples: Vec<Triple>) -> Dataset {
    Dataset::from_user_graph(graph(triples))
}

pub fn titled(subject: &Iri, title: &str) -> Dataset {
    dataset(vec![triple(subject, DCTERMS_TITLE, Literal::simple(title))])
}
