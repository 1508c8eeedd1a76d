use crate::models::workflow_event::WorkflowEvent;
use tokio::sync::broadcast;

/// Live update pushed to dashboard subscribers after each append
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub event: WorkflowEvent,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

/// Fan-out publisher for appended workflow events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an appended event to all subscribers.
    ///
    /// Publishing with zero subscribers is not an error; the log is the
    /// system of record and the stream is best-effort.
    pub async fn publish(&self, event: WorkflowEvent) -> Result<(), PublishError> {
        let published = PublishedEvent {
            event,
            published_at: chrono::Utc::now(),
        };

        match self.sender.send(published) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Subscribe to appended events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(crate::constants::defaults::EVENT_CHANNEL_CAPACITY)
    }
}
