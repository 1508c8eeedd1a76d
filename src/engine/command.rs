//! Commands accepted by the engine.
//!
//! Each command maps to exactly one event type; the payload it produces
//! is what replay will see, so commands are the only place payload
//! shapes are decided.

use crate::models::workflow_event::EventType;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A requested workflow transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkflowCommand {
    Start,
    Pause,
    Resume,
    Complete,
    Fail {
        error: String,
    },
    Cancel,
    StartStep {
        step_id: String,
    },
    CompleteStep {
        step_id: String,
        #[serde(default)]
        output: Value,
    },
    FailStep {
        step_id: String,
        error: String,
    },
    SkipStep {
        step_id: String,
    },
    CancelStep {
        step_id: String,
    },
    AssignAgent {
        step_id: String,
        agent_id: String,
    },
}

impl WorkflowCommand {
    /// The event type this command appends on success
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Start => EventType::WorkflowStarted,
            Self::Pause => EventType::WorkflowPaused,
            Self::Resume => EventType::WorkflowResumed,
            Self::Complete => EventType::WorkflowCompleted,
            Self::Fail { .. } => EventType::WorkflowFailed,
            Self::Cancel => EventType::WorkflowCancelled,
            Self::StartStep { .. } => EventType::StepStarted,
            Self::CompleteStep { .. } => EventType::StepCompleted,
            Self::FailStep { .. } => EventType::StepFailed,
            Self::SkipStep { .. } => EventType::StepSkipped,
            Self::CancelStep { .. } => EventType::StepCancelled,
            Self::AssignAgent { .. } => EventType::AgentAssigned,
        }
    }

    /// The event payload this command produces
    pub fn payload(&self) -> Value {
        match self {
            Self::Start | Self::Pause | Self::Resume | Self::Complete | Self::Cancel => json!({}),
            Self::Fail { error } => json!({"error": error}),
            Self::StartStep { step_id } => json!({"step_id": step_id}),
            Self::CompleteStep { step_id, output } => {
                json!({"step_id": step_id, "output": output})
            }
            Self::FailStep { step_id, error } => json!({"step_id": step_id, "error": error}),
            Self::SkipStep { step_id } => json!({"step_id": step_id}),
            Self::CancelStep { step_id } => json!({"step_id": step_id}),
            Self::AssignAgent { step_id, agent_id } => {
                json!({"step_id": step_id, "agent_id": agent_id})
            }
        }
    }
}
