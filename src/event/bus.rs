//! In-process notification channel.

use std::sync::mpsc::{channel, Receiver, Sender};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::LdpError;
use crate::event::{EventSink, Notification};

/// Sink that forwards notifications to a [`Receiver`] held by the consumer
pub struct ChannelEventSink {
    sender: Mutex<Sender<Notification>>,
}

impl ChannelEventSink {
    pub fn new_pair() -> (Self, Receiver<Notification>) {
        let (sender, receiver) = channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, notification: Notification) -> Result<(), LdpError> {
        self.sender
            .lock()
            .send(notification)
            .map_err(|e| LdpError::Internal(format!("Notification receiver dropped: {}", e)))
    }
}
