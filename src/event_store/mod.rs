//! # Event Store
//!
//! Append-only persistence for workflow events. Appends are atomic per
//! workflow: sequence numbers are assigned under the store's own
//! coordination, so no two events for the same workflow ever share a
//! sequence number, and optimistic concurrency surfaces racing writers
//! as [`EventStoreError::ConcurrentAppendConflict`].
//!
//! Two implementations: an in-memory store for single-node deployments
//! and tests, and a PostgreSQL store behind the `postgres` feature.

pub mod errors;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use errors::{EventStoreError, EventStoreResult};
pub use memory::InMemoryEventStore;
#[cfg(feature = "postgres")]
pub use postgres::PgEventStore;

use crate::models::workflow_event::{NewWorkflowEvent, WorkflowEvent};
use async_trait::async_trait;
use uuid::Uuid;

/// Append-only event persistence, atomic per workflow.
///
/// `expected_sequence` is the head the caller believes the log has
/// (zero for a new workflow). A mismatch means another writer appended
/// first; the store rejects the batch without assigning sequence
/// numbers.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append a validated batch, assigning contiguous sequence numbers
    /// starting at `expected_sequence + 1`. Returns the stored events.
    async fn append(
        &self,
        workflow_id: Uuid,
        expected_sequence: u64,
        events: Vec<NewWorkflowEvent>,
    ) -> EventStoreResult<Vec<WorkflowEvent>>;

    /// Load the full log for a workflow in sequence order
    async fn load(&self, workflow_id: Uuid) -> EventStoreResult<Vec<WorkflowEvent>>;

    /// Load the log truncated at `as_of_sequence` (inclusive)
    async fn load_until(
        &self,
        workflow_id: Uuid,
        as_of_sequence: u64,
    ) -> EventStoreResult<Vec<WorkflowEvent>>;

    /// Highest assigned sequence number, or None for an unknown workflow
    async fn head_sequence(&self, workflow_id: Uuid) -> EventStoreResult<Option<u64>>;

    /// All workflow ids present in the store, for recovery scans
    async fn workflow_ids(&self) -> EventStoreResult<Vec<Uuid>>;
}

/// Verify a loaded log is gap-free and starts at sequence 1.
///
/// Stores enforce this at append time; checking again on load turns
/// out-of-band corruption into a structured error instead of a bad
/// replay.
pub(crate) fn verify_contiguous(
    workflow_id: Uuid,
    events: &[WorkflowEvent],
) -> EventStoreResult<()> {
    for (index, event) in events.iter().enumerate() {
        let expected = index as u64 + 1;
        if event.sequence_number != expected {
            return Err(EventStoreError::SequenceGap {
                workflow_id,
                expected,
                found: event.sequence_number,
            });
        }
    }
    Ok(())
}
