//! Step-level transition table.

use super::errors::{StateMachineError, StateMachineResult};
use super::states::StepStatus;
use crate::models::workflow_event::EventType;

/// Determine the target step status for an event, or reject the edge.
///
/// Legal edges: pending -> {running | completed | skipped | cancelled},
/// running -> {completed | failed | cancelled}. All other statuses are
/// terminal. Direct pending -> completed covers agents that report only
/// terminal results, without an interim started event.
pub fn determine_step_target(
    step_id: &str,
    current: StepStatus,
    event: EventType,
) -> StateMachineResult<StepStatus> {
    let target = match (current, event) {
        (StepStatus::Pending, EventType::StepStarted) => StepStatus::Running,
        (StepStatus::Pending, EventType::StepCompleted) => StepStatus::Completed,
        (StepStatus::Pending, EventType::StepSkipped) => StepStatus::Skipped,
        (StepStatus::Pending, EventType::StepCancelled) => StepStatus::Cancelled,

        (StepStatus::Running, EventType::StepCompleted) => StepStatus::Completed,
        (StepStatus::Running, EventType::StepFailed) => StepStatus::Failed,
        (StepStatus::Running, EventType::StepCancelled) => StepStatus::Cancelled,

        (from, event) => {
            return Err(StateMachineError::InvalidStepTransition {
                step_id: step_id.to_string(),
                from: from.to_string(),
                event: event.to_string(),
            })
        }
    };

    Ok(target)
}
