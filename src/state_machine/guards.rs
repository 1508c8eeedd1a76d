//! Transition guards evaluated against the current snapshot.
//!
//! Guards run after the edge check and before the event is appended, so
//! a guard failure leaves no trace in the log.

use super::errors::{dependencies_not_met, StateMachineError, StateMachineResult};
use crate::models::snapshot::WorkflowStateSnapshot;
use crate::models::workflow_definition::WorkflowDefinition;

/// Trait for implementing state transition guards
pub trait StateGuard {
    /// Check if the transition is allowed under the current snapshot
    fn check(
        &self,
        definition: &WorkflowDefinition,
        snapshot: &WorkflowStateSnapshot,
    ) -> StateMachineResult<()>;

    /// Description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Guard: every step must have reached a satisfying status before the
/// workflow may complete
pub struct AllStepsSatisfiedGuard;

impl StateGuard for AllStepsSatisfiedGuard {
    fn check(
        &self,
        _definition: &WorkflowDefinition,
        snapshot: &WorkflowStateSnapshot,
    ) -> StateMachineResult<()> {
        let remaining = snapshot.unsatisfied_step_count();
        if remaining > 0 {
            return Err(StateMachineError::IncompleteSteps { remaining });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "All steps must be completed or skipped before workflow completion"
    }
}

/// Guard: a step may start only when every declared dependency has
/// reached a satisfying status
pub struct StepDependenciesMetGuard<'a> {
    pub step_id: &'a str,
}

impl StateGuard for StepDependenciesMetGuard<'_> {
    fn check(
        &self,
        definition: &WorkflowDefinition,
        snapshot: &WorkflowStateSnapshot,
    ) -> StateMachineResult<()> {
        let step = definition
            .step(self.step_id)
            .ok_or_else(|| StateMachineError::UnknownStep {
                step_id: self.step_id.to_string(),
            })?;

        let unmet: Vec<String> = step
            .dependencies
            .iter()
            .filter(|dep| {
                snapshot
                    .step_status(dep)
                    .map(|status| !status.satisfies_dependencies())
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        if unmet.is_empty() {
            Ok(())
        } else {
            Err(dependencies_not_met(self.step_id, unmet))
        }
    }

    fn description(&self) -> &'static str {
        "All step dependencies must be satisfied before the step starts"
    }
}

/// Guard: agents may only be assigned to steps that are not terminal
pub struct StepNotTerminalGuard<'a> {
    pub step_id: &'a str,
}

impl StateGuard for StepNotTerminalGuard<'_> {
    fn check(
        &self,
        _definition: &WorkflowDefinition,
        snapshot: &WorkflowStateSnapshot,
    ) -> StateMachineResult<()> {
        let status =
            snapshot
                .step_status(self.step_id)
                .ok_or_else(|| StateMachineError::UnknownStep {
                    step_id: self.step_id.to_string(),
                })?;

        if status.is_terminal() {
            return Err(StateMachineError::StepAlreadyTerminal {
                step_id: self.step_id.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Agent assignment requires a non-terminal step"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection;
    use crate::state_machine::states::StepStatus;
    use crate::models::workflow_definition::{StepDefinition, StepType};
    use uuid::Uuid;

    fn fixture() -> (WorkflowDefinition, WorkflowStateSnapshot) {
        let definition = WorkflowDefinition {
            workflow_id: Uuid::new_v4(),
            name: "guards".to_string(),
            steps: vec![
                StepDefinition {
                    step_id: "fetch".to_string(),
                    name: "fetch".to_string(),
                    step_type: StepType::Sequential,
                    dependencies: vec![],
                    parameters: serde_json::json!({}),
                },
                StepDefinition {
                    step_id: "process".to_string(),
                    name: "process".to_string(),
                    step_type: StepType::Sequential,
                    dependencies: vec!["fetch".to_string()],
                    parameters: serde_json::json!({}),
                },
            ],
            global_parameters: serde_json::json!({}),
            timeout_seconds: None,
            retry_policy: None,
        };
        let snapshot = projection::creation_snapshot(&definition);
        (definition, snapshot)
    }

    #[test]
    fn test_dependencies_guard_blocks_until_satisfied() {
        let (definition, mut snapshot) = fixture();
        let guard = StepDependenciesMetGuard { step_id: "process" };

        let err = guard.check(&definition, &snapshot).unwrap_err();
        assert!(matches!(
            err,
            StateMachineError::DependenciesNotSatisfied { .. }
        ));

        snapshot
            .step_states
            .insert("fetch".to_string(), StepStatus::Completed);
        assert!(guard.check(&definition, &snapshot).is_ok());
    }

    #[test]
    fn test_completion_guard_counts_unsatisfied_steps() {
        let (definition, mut snapshot) = fixture();
        let guard = AllStepsSatisfiedGuard;

        assert_eq!(
            guard.check(&definition, &snapshot),
            Err(StateMachineError::IncompleteSteps { remaining: 2 })
        );

        snapshot
            .step_states
            .insert("fetch".to_string(), StepStatus::Completed);
        snapshot
            .step_states
            .insert("process".to_string(), StepStatus::Skipped);
        assert!(guard.check(&definition, &snapshot).is_ok());
    }

    #[test]
    fn test_terminal_guard_rejects_finished_steps() {
        let (definition, mut snapshot) = fixture();
        snapshot
            .step_states
            .insert("fetch".to_string(), StepStatus::Completed);

        let guard = StepNotTerminalGuard { step_id: "fetch" };
        assert!(matches!(
            guard.check(&definition, &snapshot),
            Err(StateMachineError::StepAlreadyTerminal { .. })
        ));
    }
}
