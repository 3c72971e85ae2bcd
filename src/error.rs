//! Error types for the LDP resource store.

use crate::constraint::ConstraintViolation;
use crate::rdf::Iri;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Digest mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    /// Backend failure (sled, filesystem) during `operation`.
    pub(crate) fn backend(operation: &str, err: impl std::fmt::Display) -> Self {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to {}: {}", operation, err),
        ))
    }

    /// Encoding or decoding failure during `operation`.
    pub(crate) fn codec(operation: &str, err: impl std::fmt::Display) -> Self {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to {}: {}", operation, err),
        ))
    }
}

/// Errors surfaced by repository and service operations
#[derive(Debug, Error)]
pub enum LdpError {
    #[error("Resource not found: {0}")]
    NotFound(Iri),

    #[error("Resource has been deleted: {0}")]
    Gone(Iri),

    #[error("Resource already exists: {0}")]
    AlreadyExists(Iri),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Constraint violations: {}", summarize(.0))]
    ConstraintViolations(Vec<ConstraintViolation>),

    #[error("Parent is not a live container: {0}")]
    InvalidParent(Iri),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LdpError {
    /// True for both missing and tombstoned resources.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LdpError::NotFound(_) | LdpError::Gone(_))
    }

    /// HTTP status the web layer maps this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            LdpError::NotFound(_) => 404,
            LdpError::Gone(_) => 410,
            LdpError::AlreadyExists(_) | LdpError::Conflict(_) => 409,
            LdpError::ConstraintViolations(_) => 422,
            LdpError::InvalidParent(_) => 405,
            LdpError::MalformedInput(_) => 400,
            LdpError::StorageError(_) | LdpError::ConfigError(_) | LdpError::Internal(_) => 500,
        }
    }

    /// Constraint IRIs for `Link: <...>; rel="http://www.w3.org/ns/ldp#constrainedBy"`.
    pub fn constrained_by(&self) -> Vec<&'static str> {
        match self {
            LdpError::ConstraintViolations(violations) => {
                let mut iris: Vec<&'static str> =
                    violations.iter().map(|v| v.kind.as_str()).collect();
                iris.sort_unstable();
                iris.dedup();
                iris
            }
            _ => Vec::new(),
        }
    }
}

impl From<config::ConfigError> for LdpError {
    fn from(err: config::ConfigError) -> Self {
        LdpError::ConfigError(err.to_string())
    }
}

fn summarize(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|v| v.kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
