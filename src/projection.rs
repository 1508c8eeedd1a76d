//! # Event Log Projection
//!
//! The fold from an append-only event log to a [`WorkflowStateSnapshot`].
//! `apply_event` is the single code path for both pre-append validation
//! and replay, which keeps the core invariant cheap to state: a snapshot
//! at sequence N equals the fold of all events with sequence <= N.
//!
//! Everything here is pure and side-effect-free. Events are sorted by
//! sequence number before folding, so arrival order never changes the
//! result.

use crate::models::snapshot::WorkflowStateSnapshot;
use crate::models::workflow_definition::{DefinitionError, WorkflowDefinition};
use crate::models::workflow_event::{EventType, WorkflowEvent};
use crate::state_machine::errors::{missing_field, StateMachineError, StateMachineResult};
use crate::state_machine::guards::{
    AllStepsSatisfiedGuard, StateGuard, StepDependenciesMetGuard, StepNotTerminalGuard,
};
use crate::state_machine::states::{StepStatus, WorkflowState};
use crate::state_machine::{derive_substate, determine_step_target, determine_target_state};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while rebuilding a snapshot from the log.
///
/// The store only accepts validated events, so most of these indicate a
/// corrupted or tampered log rather than a caller mistake.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("event log is empty")]
    EmptyLog,

    #[error("first event must be workflow_created, found {found} at sequence {sequence}")]
    MissingCreationEvent { found: String, sequence: u64 },

    #[error("sequence gap in workflow {workflow_id}: expected {expected}, found {found}")]
    SequenceGap {
        workflow_id: Uuid,
        expected: u64,
        found: u64,
    },

    #[error("event at sequence {sequence} belongs to workflow {found}, not {expected}")]
    ForeignEvent {
        expected: Uuid,
        found: Uuid,
        sequence: u64,
    },

    #[error("corrupt payload at sequence {sequence}: {detail}")]
    CorruptPayload { sequence: u64, detail: String },

    #[error("stored definition failed validation: {0}")]
    InvalidDefinition(#[from] DefinitionError),

    #[error("illegal event at sequence {sequence}: {source}")]
    IllegalEvent {
        sequence: u64,
        source: StateMachineError,
    },
}

/// Result of replaying a workflow's event log
#[derive(Debug, Clone, PartialEq)]
pub struct RebuiltWorkflow {
    pub definition: WorkflowDefinition,
    pub snapshot: WorkflowStateSnapshot,
}

/// Snapshot as it exists immediately after `workflow_created`: pending,
/// no substate, every step pending, nothing assigned.
///
/// `snapshot_sequence` is zero until the creation event is folded in.
pub fn creation_snapshot(definition: &WorkflowDefinition) -> WorkflowStateSnapshot {
    let step_states: BTreeMap<String, StepStatus> = definition
        .steps
        .iter()
        .map(|step| (step.step_id.clone(), StepStatus::Pending))
        .collect();

    WorkflowStateSnapshot {
        workflow_id: definition.workflow_id,
        current_state: WorkflowState::Pending,
        current_substate: None,
        step_states,
        step_assignments: BTreeMap::new(),
        snapshot_sequence: 0,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

/// Apply one post-creation event to a snapshot, validating the edge and
/// its guards. Sequence number and timestamp bookkeeping belong to the
/// caller; this function only advances state.
pub fn apply_event(
    definition: &WorkflowDefinition,
    snapshot: &mut WorkflowStateSnapshot,
    event_type: EventType,
    payload: &Value,
) -> StateMachineResult<()> {
    match event_type {
        // A second creation event is never legal
        EventType::WorkflowCreated => Err(StateMachineError::InvalidTransition {
            from: snapshot.current_state.to_string(),
            event: event_type.to_string(),
        }),

        EventType::WorkflowStarted
        | EventType::WorkflowPaused
        | EventType::WorkflowResumed
        | EventType::WorkflowCompleted
        | EventType::WorkflowFailed
        | EventType::WorkflowCancelled => {
            let target = determine_target_state(snapshot.current_state, event_type)?;
            if event_type == EventType::WorkflowCompleted {
                AllStepsSatisfiedGuard.check(definition, snapshot)?;
            }
            snapshot.current_state = target;
            snapshot.current_substate = if target.is_active() {
                Some(derive_substate(definition, &snapshot.step_states))
            } else {
                None
            };
            Ok(())
        }

        EventType::StepStarted
        | EventType::StepCompleted
        | EventType::StepFailed
        | EventType::StepSkipped
        | EventType::StepCancelled => {
            if !snapshot.current_state.accepts_step_events() {
                return Err(StateMachineError::InvalidTransition {
                    from: snapshot.current_state.to_string(),
                    event: event_type.to_string(),
                });
            }
            let step_id = payload
                .get("step_id")
                .and_then(Value::as_str)
                .ok_or_else(|| missing_field("step_id"))?;
            let current = snapshot.step_status(step_id).ok_or_else(|| {
                StateMachineError::UnknownStep {
                    step_id: step_id.to_string(),
                }
            })?;
            let target = determine_step_target(step_id, current, event_type)?;
            // Leaving pending toward execution requires satisfied
            // dependencies; skip and cancel are exempt
            let starts_execution = event_type == EventType::StepStarted
                || (event_type == EventType::StepCompleted && current == StepStatus::Pending);
            if starts_execution {
                StepDependenciesMetGuard { step_id }.check(definition, snapshot)?;
            }
            snapshot.step_states.insert(step_id.to_string(), target);
            snapshot.current_substate =
                Some(derive_substate(definition, &snapshot.step_states));
            Ok(())
        }

        EventType::AgentAssigned => {
            if snapshot.current_state.is_terminal()
                || snapshot.current_state == WorkflowState::Paused
            {
                return Err(StateMachineError::InvalidTransition {
                    from: snapshot.current_state.to_string(),
                    event: event_type.to_string(),
                });
            }
            let step_id = payload
                .get("step_id")
                .and_then(Value::as_str)
                .ok_or_else(|| missing_field("step_id"))?;
            let agent_id = payload
                .get("agent_id")
                .and_then(Value::as_str)
                .ok_or_else(|| missing_field("agent_id"))?;
            StepNotTerminalGuard { step_id }.check(definition, snapshot)?;
            snapshot
                .step_assignments
                .insert(step_id.to_string(), agent_id.to_string());
            Ok(())
        }
    }
}

/// Rebuild a workflow by folding its event log in sequence order.
///
/// Idempotent and deterministic: two rebuilds of the same prefix yield
/// identical snapshots, including timestamps, because `updated_at` comes
/// from the folded events themselves.
pub fn rebuild(events: &[WorkflowEvent]) -> Result<RebuiltWorkflow, ReplayError> {
    let mut ordered: Vec<&WorkflowEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.sequence_number);

    let first = ordered.first().ok_or(ReplayError::EmptyLog)?;
    if first.event_type != EventType::WorkflowCreated {
        return Err(ReplayError::MissingCreationEvent {
            found: first.event_type.to_string(),
            sequence: first.sequence_number,
        });
    }
    if first.sequence_number != 1 {
        return Err(ReplayError::SequenceGap {
            workflow_id: first.workflow_id,
            expected: 1,
            found: first.sequence_number,
        });
    }

    let definition_value =
        first
            .payload
            .get("definition")
            .cloned()
            .ok_or_else(|| ReplayError::CorruptPayload {
                sequence: first.sequence_number,
                detail: "workflow_created payload has no definition".to_string(),
            })?;
    let definition: WorkflowDefinition =
        serde_json::from_value(definition_value).map_err(|e| ReplayError::CorruptPayload {
            sequence: first.sequence_number,
            detail: e.to_string(),
        })?;
    definition.validate()?;

    if first.workflow_id != definition.workflow_id {
        return Err(ReplayError::ForeignEvent {
            expected: definition.workflow_id,
            found: first.workflow_id,
            sequence: first.sequence_number,
        });
    }

    let mut snapshot = creation_snapshot(&definition);
    snapshot.snapshot_sequence = first.sequence_number;
    snapshot.updated_at = first.timestamp;

    let mut expected_sequence = first.sequence_number;
    for event in ordered.iter().skip(1) {
        expected_sequence += 1;
        if event.sequence_number != expected_sequence {
            return Err(ReplayError::SequenceGap {
                workflow_id: definition.workflow_id,
                expected: expected_sequence,
                found: event.sequence_number,
            });
        }
        if event.workflow_id != definition.workflow_id {
            return Err(ReplayError::ForeignEvent {
                expected: definition.workflow_id,
                found: event.workflow_id,
                sequence: event.sequence_number,
            });
        }

        apply_event(&definition, &mut snapshot, event.event_type, &event.payload).map_err(
            |source| ReplayError::IllegalEvent {
                sequence: event.sequence_number,
                source,
            },
        )?;
        snapshot.snapshot_sequence = event.sequence_number;
        snapshot.updated_at = event.timestamp;
    }

    Ok(RebuiltWorkflow {
        definition,
        snapshot,
    })
}
