//! # Workflow State Snapshots
//!
//! A snapshot is a derived, materialized projection of the event log at a
//! given sequence point. It is never authoritative: replaying all events
//! with `sequence_number <= snapshot_sequence` must reproduce it exactly.

use crate::state_machine::states::{ExecutionSubstate, StepStatus, WorkflowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Derived view of a workflow at a specific event sequence.
///
/// Maps are ordered so serialized snapshots are byte-stable across
/// rebuilds, and `updated_at` is taken from the last folded event rather
/// than the wall clock for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStateSnapshot {
    pub workflow_id: Uuid,
    pub current_state: WorkflowState,
    /// Present only while `current_state` is active
    pub current_substate: Option<ExecutionSubstate>,
    pub step_states: BTreeMap<String, StepStatus>,
    /// step_id to assigned agent_id
    pub step_assignments: BTreeMap<String, String>,
    /// Sequence number of the last event folded into this snapshot
    pub snapshot_sequence: u64,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowStateSnapshot {
    /// Status of a single step, if the step exists
    pub fn step_status(&self, step_id: &str) -> Option<StepStatus> {
        self.step_states.get(step_id).copied()
    }

    /// Check if every step reached a status that satisfies dependents
    pub fn all_steps_satisfied(&self) -> bool {
        self.step_states
            .values()
            .all(|status| status.satisfies_dependencies())
    }

    /// Count of steps that have not reached a satisfying status
    pub fn unsatisfied_step_count(&self) -> usize {
        self.step_states
            .values()
            .filter(|status| !status.satisfies_dependencies())
            .count()
    }

    /// Check if any step is currently running
    pub fn has_running_steps(&self) -> bool {
        self.step_states.values().any(|status| status.is_active())
    }
}
