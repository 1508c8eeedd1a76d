//! Shared fixtures and helpers for integration tests.

pub mod strategies;

use chrono::{DateTime, Duration, Utc};
use flowstate_core::models::{EventType, WorkflowDefinition, WorkflowEvent};
use flowstate_core::projection;
use flowstate_core::state_machine::states::StepStatus;
use serde_json::{json, Value};
use uuid::Uuid;

/// Build an event with a deterministic timestamp derived from its sequence
pub fn event(
    definition: &WorkflowDefinition,
    sequence: u64,
    event_type: EventType,
    payload: Value,
) -> WorkflowEvent {
    WorkflowEvent {
        event_id: Uuid::new_v4(),
        workflow_id: definition.workflow_id,
        event_type,
        sequence_number: sequence,
        timestamp: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(sequence as i64),
        payload,
        causation_id: None,
        correlation_id: None,
    }
}

/// The mandatory first event, carrying the full definition
pub fn creation_event(definition: &WorkflowDefinition) -> WorkflowEvent {
    event(
        definition,
        1,
        EventType::WorkflowCreated,
        json!({"definition": serde_json::to_value(definition).unwrap()}),
    )
}

/// Drive a definition through a full legal lifecycle and return the log.
///
/// Steps are processed in dependency order; `skip[i]` selects skipping
/// over execution for the i-th definition step. Ends with
/// `workflow_completed`, so the log always replays to a completed
/// workflow. Every produced event is validated through the same fold the
/// engine uses, so the output is legal by construction.
pub fn lifecycle_events(definition: &WorkflowDefinition, skip: &[bool]) -> Vec<WorkflowEvent> {
    let mut events = vec![creation_event(definition)];
    let mut snapshot = projection::creation_snapshot(definition);
    let mut sequence = 1u64;

    let push = |events: &mut Vec<WorkflowEvent>,
                    snapshot: &mut flowstate_core::WorkflowStateSnapshot,
                    sequence: &mut u64,
                    event_type: EventType,
                    payload: Value| {
        projection::apply_event(definition, snapshot, event_type, &payload)
            .expect("lifecycle script produced an illegal event");
        *sequence += 1;
        events.push(event(definition, *sequence, event_type, payload));
    };

    push(
        &mut events,
        &mut snapshot,
        &mut sequence,
        EventType::WorkflowStarted,
        json!({}),
    );

    loop {
        let ready: Option<(usize, String)> = definition.steps.iter().enumerate().find_map(
            |(index, step)| {
                let pending = snapshot.step_status(&step.step_id) == Some(StepStatus::Pending);
                let satisfied = step.dependencies.iter().all(|dep| {
                    snapshot
                        .step_status(dep)
                        .map(|s| s.satisfies_dependencies())
                        .unwrap_or(false)
                });
                (pending && satisfied).then(|| (index, step.step_id.clone()))
            },
        );

        let Some((index, step_id)) = ready else { break };

        if skip.get(index).copied().unwrap_or(false) {
            push(
                &mut events,
                &mut snapshot,
                &mut sequence,
                EventType::StepSkipped,
                json!({"step_id": step_id}),
            );
        } else {
            push(
                &mut events,
                &mut snapshot,
                &mut sequence,
                EventType::StepStarted,
                json!({"step_id": step_id}),
            );
            push(
                &mut events,
                &mut snapshot,
                &mut sequence,
                EventType::StepCompleted,
                json!({"step_id": step_id}),
            );
        }
    }

    push(
        &mut events,
        &mut snapshot,
        &mut sequence,
        EventType::WorkflowCompleted,
        json!({}),
    );

    events
}
