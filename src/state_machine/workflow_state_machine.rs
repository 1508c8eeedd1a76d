//! Workflow-level transition table and substate derivation.
//!
//! The table is the single source of truth for legal edges. An event
//! whose edge is absent here is rejected before it reaches the store.

use super::errors::{StateMachineError, StateMachineResult};
use super::states::{ExecutionSubstate, StepStatus, WorkflowState};
use crate::models::workflow_definition::{StepType, WorkflowDefinition};
use crate::models::workflow_event::EventType;
use std::collections::BTreeMap;

/// Determine the target workflow state for an event, or reject the edge.
///
/// Legal edges: pending -> active <-> paused -> {completed | failed |
/// cancelled}, with the three terminal states absorbing.
pub fn determine_target_state(
    current: WorkflowState,
    event: EventType,
) -> StateMachineResult<WorkflowState> {
    let target = match (current, event) {
        (WorkflowState::Pending, EventType::WorkflowStarted) => WorkflowState::Active,

        (WorkflowState::Active, EventType::WorkflowPaused) => WorkflowState::Paused,
        (WorkflowState::Paused, EventType::WorkflowResumed) => WorkflowState::Active,

        (WorkflowState::Active, EventType::WorkflowCompleted) => WorkflowState::Completed,

        (WorkflowState::Active, EventType::WorkflowFailed)
        | (WorkflowState::Paused, EventType::WorkflowFailed) => WorkflowState::Failed,

        (WorkflowState::Pending, EventType::WorkflowCancelled)
        | (WorkflowState::Active, EventType::WorkflowCancelled)
        | (WorkflowState::Paused, EventType::WorkflowCancelled) => WorkflowState::Cancelled,

        (from, event) => {
            return Err(StateMachineError::InvalidTransition {
                from: from.to_string(),
                event: event.to_string(),
            })
        }
    };

    Ok(target)
}

/// Derive the execution substate from the current step table.
///
/// Substates are never commanded directly; they are a pure function of
/// step statuses, recomputed after every applied event and on resume.
pub fn derive_substate(
    definition: &WorkflowDefinition,
    step_states: &BTreeMap<String, StepStatus>,
) -> ExecutionSubstate {
    if step_states.values().all(|status| status.is_terminal()) {
        return ExecutionSubstate::Finalizing;
    }
    if step_states.values().all(|status| *status == StepStatus::Pending) {
        return ExecutionSubstate::Initializing;
    }

    let synchronizing = step_states.iter().any(|(step_id, status)| {
        status.is_active()
            && definition
                .step(step_id)
                .map(|s| s.step_type == StepType::Synchronization)
                .unwrap_or(false)
    });
    if synchronizing {
        return ExecutionSubstate::Synchronizing;
    }
    if step_states.values().any(|status| status.is_active()) {
        return ExecutionSubstate::Executing;
    }

    ExecutionSubstate::Waiting
}
