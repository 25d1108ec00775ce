//! Status Broadcast
//!
//! Topic-addressed, fire-and-forget fan-out of task events to live
//! subscribers.
//!
//! ## Delivery semantics
//!
//! - Publishing never blocks and never reports subscriber-side failures
//! - At-most-once: a subscriber that joins after a publish never sees it, and
//!   a subscriber that falls more than the channel capacity behind skips ahead
//! - Events on one topic arrive in publish order

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::BroadcastError;
use crate::models::TaskStatus;

/// Topic that carries task status changes
pub const STATUS_TOPIC: &str = "task_status_updates";

/// Event type tag for status change messages
pub const STATUS_EVENT_TYPE: &str = "task_status_update";

/// A message delivered to topic subscribers, sent to clients as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl BroadcastEvent {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

// == Channel Layer ==
/// Named topics, each backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelLayer {
    topics: Arc<DashMap<String, broadcast::Sender<BroadcastEvent>>>,
    capacity: usize,
}

impl ChannelLayer {
    /// `capacity` is the number of events buffered per topic.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Joins a topic, creating it on first use.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<BroadcastEvent> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Sends `event` to every current subscriber of `topic`.
    ///
    /// Returns how many subscribers it reached. A topic with nobody listening
    /// is dropped so idle topics do not accumulate.
    pub fn group_send(&self, topic: &str, event: BroadcastEvent) -> Result<usize, BroadcastError> {
        let sent = match self.topics.get(topic) {
            Some(sender) => sender.send(event).ok(),
            None => None,
        };

        match sent {
            Some(reached) => Ok(reached),
            None => {
                self.topics
                    .remove_if(topic, |_, sender| sender.receiver_count() == 0);
                Err(BroadcastError::NoSubscribers {
                    topic: topic.to_string(),
                })
            }
        }
    }

    /// Current number of subscribers on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

// == Status Broadcast ==
/// Publishes task status changes on [`STATUS_TOPIC`].
#[derive(Debug, Clone)]
pub struct StatusBroadcast {
    layer: ChannelLayer,
}

impl StatusBroadcast {
    pub fn new(layer: ChannelLayer) -> Self {
        Self { layer }
    }

    /// Formats the human-readable status message for a task.
    pub fn status_message(task_id: u64, status: TaskStatus) -> String {
        format!("Task #{}: status changed to {}.", task_id, status)
    }

    /// Announces a status change. Fire-and-forget: never fails the caller.
    pub fn notify_status_change(&self, task_id: u64, status: TaskStatus) {
        let event = BroadcastEvent::new(
            STATUS_EVENT_TYPE,
            Self::status_message(task_id, status),
        );

        match self.layer.group_send(STATUS_TOPIC, event) {
            Ok(reached) => info!(
                "Task #{} status change sent to {} subscriber(s)",
                task_id, reached
            ),
            Err(e) => debug!("Task #{} status change not delivered: {}", task_id, e),
        }
    }

    /// Joins the status topic.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.layer.subscribe(STATUS_TOPIC)
    }

    pub fn layer(&self) -> &ChannelLayer {
        &self.layer
    }
}
