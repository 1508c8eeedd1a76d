//! Engine error taxonomy, aggregating the layers beneath it.

use crate::event_store::EventStoreError;
use crate::models::workflow_definition::DefinitionError;
use crate::projection::ReplayError;
use crate::state_machine::StateMachineError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("workflow not found: {0}")]
    WorkflowNotFound(Uuid),

    #[error("workflow already exists: {0}")]
    WorkflowAlreadyExists(Uuid),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    #[error(transparent)]
    Store(#[from] EventStoreError),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}

impl EngineError {
    /// Check if this error is a concurrent append conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Store(EventStoreError::ConcurrentAppendConflict { .. })
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
