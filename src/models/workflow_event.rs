//! # Workflow Events
//!
//! Immutable, strictly ordered facts. The event log is the system of
//! record: events are append-only and never updated or deleted. Current
//! state is always derivable by replaying events in sequence order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The 13 transition event types recognized by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    WorkflowCreated,
    WorkflowStarted,
    WorkflowPaused,
    WorkflowResumed,
    WorkflowCompleted,
    WorkflowFailed,
    WorkflowCancelled,
    StepStarted,
    StepCompleted,
    StepFailed,
    StepSkipped,
    StepCancelled,
    AgentAssigned,
}

impl EventType {
    /// All event types, in declaration order
    pub const ALL: [EventType; 13] = [
        Self::WorkflowCreated,
        Self::WorkflowStarted,
        Self::WorkflowPaused,
        Self::WorkflowResumed,
        Self::WorkflowCompleted,
        Self::WorkflowFailed,
        Self::WorkflowCancelled,
        Self::StepStarted,
        Self::StepCompleted,
        Self::StepFailed,
        Self::StepSkipped,
        Self::StepCancelled,
        Self::AgentAssigned,
    ];

    /// Check if this event targets the workflow as a whole
    pub fn is_workflow_event(&self) -> bool {
        matches!(
            self,
            Self::WorkflowCreated
                | Self::WorkflowStarted
                | Self::WorkflowPaused
                | Self::WorkflowResumed
                | Self::WorkflowCompleted
                | Self::WorkflowFailed
                | Self::WorkflowCancelled
        )
    }

    /// Check if this event targets an individual step
    pub fn is_step_event(&self) -> bool {
        matches!(
            self,
            Self::StepStarted
                | Self::StepCompleted
                | Self::StepFailed
                | Self::StepSkipped
                | Self::StepCancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkflowCreated => "workflow_created",
            Self::WorkflowStarted => "workflow_started",
            Self::WorkflowPaused => "workflow_paused",
            Self::WorkflowResumed => "workflow_resumed",
            Self::WorkflowCompleted => "workflow_completed",
            Self::WorkflowFailed => "workflow_failed",
            Self::WorkflowCancelled => "workflow_cancelled",
            Self::StepStarted => "step_started",
            Self::StepCompleted => "step_completed",
            Self::StepFailed => "step_failed",
            Self::StepSkipped => "step_skipped",
            Self::StepCancelled => "step_cancelled",
            Self::AgentAssigned => "agent_assigned",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workflow_created" => Ok(Self::WorkflowCreated),
            "workflow_started" => Ok(Self::WorkflowStarted),
            "workflow_paused" => Ok(Self::WorkflowPaused),
            "workflow_resumed" => Ok(Self::WorkflowResumed),
            "workflow_completed" => Ok(Self::WorkflowCompleted),
            "workflow_failed" => Ok(Self::WorkflowFailed),
            "workflow_cancelled" => Ok(Self::WorkflowCancelled),
            "step_started" => Ok(Self::StepStarted),
            "step_completed" => Ok(Self::StepCompleted),
            "step_failed" => Ok(Self::StepFailed),
            "step_skipped" => Ok(Self::StepSkipped),
            "step_cancelled" => Ok(Self::StepCancelled),
            "agent_assigned" => Ok(Self::AgentAssigned),
            _ => Err(format!("Invalid event type: {s}")),
        }
    }
}

/// An immutable fact in a workflow's append-only log.
///
/// `sequence_number` is monotonic per workflow, starts at 1, and has no
/// gaps. `causation_id` and `correlation_id` trace causality chains
/// across services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub event_id: Uuid,
    pub workflow_id: Uuid,
    pub event_type: EventType,
    pub sequence_number: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub causation_id: Option<Uuid>,
    pub correlation_id: Option<Uuid>,
}

impl WorkflowEvent {
    /// Step id carried in the payload, when present
    pub fn step_id(&self) -> Option<&str> {
        self.payload.get("step_id").and_then(|v| v.as_str())
    }

    /// Agent id carried in the payload, when present
    pub fn agent_id(&self) -> Option<&str> {
        self.payload.get("agent_id").and_then(|v| v.as_str())
    }

    /// Error message carried by failure events, when present
    pub fn error_message(&self) -> Option<&str> {
        self.payload.get("error").and_then(|v| v.as_str())
    }
}

/// An event the engine has validated but the store has not yet sequenced.
///
/// The store assigns `event_id`, `sequence_number`, and `timestamp`
/// atomically at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkflowEvent {
    pub event_type: EventType,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub causation_id: Option<Uuid>,
    pub correlation_id: Option<Uuid>,
}

impl NewWorkflowEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            payload: serde_json::json!({}),
            causation_id: None,
            correlation_id: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_correlation(mut self, correlation_id: Option<Uuid>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn with_causation(mut self, causation_id: Option<Uuid>) -> Self {
        self.causation_id = causation_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_has_thirteen_variants() {
        assert_eq!(EventType::ALL.len(), 13);
    }

    #[test]
    fn test_event_type_round_trip() {
        for event_type in EventType::ALL {
            let parsed: EventType = event_type.as_str().parse().unwrap();
            assert_eq!(parsed, event_type);
        }
    }

    #[test]
    fn test_event_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&EventType::StepCompleted).unwrap();
        assert_eq!(json, "\"step_completed\"");
    }

    #[test]
    fn test_payload_accessors() {
        let event = WorkflowEvent {
            event_id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            event_type: EventType::AgentAssigned,
            sequence_number: 4,
            timestamp: Utc::now(),
            payload: serde_json::json!({"step_id": "pick", "agent_id": "ur5e-01"}),
            causation_id: None,
            correlation_id: None,
        };
        assert_eq!(event.step_id(), Some("pick"));
        assert_eq!(event.agent_id(), Some("ur5e-01"));
        assert_eq!(event.error_message(), None);
    }
}
