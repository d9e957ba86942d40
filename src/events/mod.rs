/// Engagement event emission
///
/// The core publishes an event after every successful stat mutation;
/// interested collaborators (notification fan-out, analytics) subscribe and
/// consume asynchronously. The core never calls those subsystems directly,
/// and publishing to zero subscribers is not an error.
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Impression,
    Click,
    ReadEnd,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementEvent {
    pub post_id: Uuid,
    pub kind: EngagementKind,
    /// Only meaningful for read-end events.
    pub engaged: Option<bool>,
    pub occurred_at: DateTime<Utc>,
}

impl EngagementEvent {
    pub fn new(post_id: Uuid, kind: EngagementKind, engaged: Option<bool>) -> Self {
        Self {
            post_id,
            kind,
            engaged,
            occurred_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct EventPublisher {
    tx: broadcast::Sender<EngagementEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngagementEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: EngagementEvent) {
        // A send error only means nobody is listening right now.
        if self.tx.send(event).is_err() {
            tracing::trace!("engagement event published with no subscribers");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}
