//! ldp-store: Linked Data Platform resource store
//!
//! Stores RDF resources under LDP containment and membership rules. Writes are
//! checked by the constraint engine, committed atomically together with the
//! server-managed triples they imply, recorded as Mementos and announced to an
//! event sink.

pub mod api;
pub mod binary;
pub mod cache;
pub mod cli;
pub mod concurrency;
pub mod config;
pub mod constraint;
pub mod error;
pub mod event;
pub mod logging;
pub mod memento;
pub mod model;
pub mod rdf;
pub mod repository;
pub mod resource;
pub mod session;
pub mod store;
pub mod vocab;

pub use api::ResourceApi;
pub use error::{LdpError, StorageError};
pub use model::InteractionModel;
pub use session::Session;
