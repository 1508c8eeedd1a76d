//! Event store error taxonomy.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by event store implementations
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Two callers raced on the same workflow; the loser sees this and
    /// must re-read before retrying
    #[error("concurrent append conflict on workflow {workflow_id}: expected head {expected}, found {actual}")]
    ConcurrentAppendConflict {
        workflow_id: Uuid,
        expected: u64,
        actual: u64,
    },

    #[error("workflow not found: {0}")]
    WorkflowNotFound(Uuid),

    #[error("workflow {workflow_id} reached the event limit of {limit}")]
    EventLimitExceeded { workflow_id: Uuid, limit: u64 },

    /// A gap discovered on load means the log was corrupted out-of-band
    #[error("sequence gap in stored log for workflow {workflow_id}: expected {expected}, found {found}")]
    SequenceGap {
        workflow_id: Uuid,
        expected: u64,
        found: u64,
    },

    #[error("append rejected: batch must contain at least one event")]
    EmptyAppend,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(String),
}

pub type EventStoreResult<T> = Result<T, EventStoreError>;
