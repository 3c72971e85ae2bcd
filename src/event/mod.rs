//! Commit notifications.
//!
//! After a mutation is committed the service hands one [`Notification`] per
//! touched resource to an [`EventSink`]. Delivery is fire-and-forget: a sink
//! failure is logged and never undoes the commit.

pub mod bus;
pub mod serialize;

pub use bus::ChannelEventSink;
pub use serialize::to_activity_stream;

use crate::error::LdpError;
use crate::model::InteractionModel;
use crate::rdf::Iri;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

static NOTIFICATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Kind of state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    /// ActivityStreams activity type IRI.
    pub fn activity_type(&self) -> &'static str {
        use crate::vocab::activity_streams as as_;
        match self {
            ChangeKind::Created => as_::CREATE,
            ChangeKind::Updated => as_::UPDATE,
            ChangeKind::Deleted => as_::DELETE,
        }
    }
}

/// Commit notification handed to the messaging layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Iri,
    pub identifier: Iri,
    pub interaction_model: InteractionModel,
    pub agent: Iri,
    pub timestamp: DateTime<Utc>,
    pub kind: ChangeKind,
}

impl Notification {
    pub fn new(
        identifier: Iri,
        interaction_model: InteractionModel,
        agent: Iri,
        timestamp: DateTime<Utc>,
        kind: ChangeKind,
    ) -> Self {
        Self {
            id: new_notification_id(),
            identifier,
            interaction_model,
            agent,
            timestamp,
            kind,
        }
    }
}

/// `urn:ldp-store:event:{ts}-{pid}-{seq}`, unique within and across processes.
pub fn new_notification_id() -> Iri {
    let ts = Utc::now().timestamp_millis();
    let pid = std::process::id();
    let seq = NOTIFICATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    Iri::new(format!("urn:ldp-store:event:{ts}-{pid}-{seq}"))
}

/// Transport for commit notifications
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, notification: Notification) -> Result<(), LdpError>;
}

/// Discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn emit(&self, _notification: Notification) -> Result<(), LdpError> {
        Ok(())
    }
}

/// Writes each notification to the log as ActivityStreams JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    async fn emit(&self, notification: Notification) -> Result<(), LdpError> {
        let body = serde_json::to_string(&to_activity_stream(&notification))
            .map_err(|e| LdpError::Internal(format!("Failed to serialize notification: {}", e)))?;
        info!(
            identifier = %notification.identifier,
            kind = ?notification.kind,
            event = %body,
            "Resource notification"
        );
        Ok(())
    }
}
