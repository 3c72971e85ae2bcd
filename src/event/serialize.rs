//! ActivityStreams rendering of notifications.

use crate::event::Notification;
use crate::vocab::activity_streams;
use chrono::SecondsFormat;
use serde_json::{json, Value};

/// JSON-LD document for `notification`.
///
/// ```text
/// { "@context": "https://www.w3.org/ns/activitystreams",
///   "id": ..., "type": ["Create"], "actor": [...],
///   "object": { "id": ..., "type": [...] }, "published": ... }
/// ```
pub fn to_activity_stream(notification: &Notification) -> Value {
    let activity = notification
        .kind
        .activity_type()
        .trim_start_matches(activity_streams::NAMESPACE);
    json!({
        "@context": activity_streams::CONTEXT,
        "id": notification.id.as_str(),
        "type": [activity],
        "actor": [notification.agent.as_str()],
        "object": {
            "id": notification.identifier.as_str(),
            "type": [notification.interaction_model.as_str()],
        },
        "published": notification
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
