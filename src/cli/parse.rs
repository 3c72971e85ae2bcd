//! CLI parse: clap types for ldp-store. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ldp-store - Linked Data Platform resource store
#[derive(Parser)]
#[command(name = "ldp-store")]
#[command(about = "Inspect and maintain a Linked Data Platform resource store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the root container if it does not exist
    Init,
    /// Print a resource as N-Triples, grouped by graph
    Get {
        /// Identifier: an IRI or a path relative to the base URL
        id: String,
        /// Show the state as of this RFC 3339 instant
        #[arg(long)]
        at: Option<String>,
    },
    /// List the recorded mementos of a resource
    Versions {
        /// Identifier: an IRI or a path relative to the base URL
        id: String,
    },
    /// Delete a resource (children are kept)
    Delete {
        /// Identifier: an IRI or a path relative to the base URL
        id: String,
    },
    /// Remove a single memento
    DeleteVersion {
        /// Identifier: an IRI or a path relative to the base URL
        id: String,
        /// Exact RFC 3339 timestamp of the memento
        time: String,
    },
    /// Print the effective configuration as TOML
    Config,
}
