//! Inbound workflow creation requests.
//!
//! The caller supplies the template content; the engine assigns the
//! workflow id and validates the definition before the first event is
//! appended.

use super::workflow_definition::{RetryPolicy, StepDefinition, WorkflowDefinition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for creating a workflow instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    pub name: String,
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub global_parameters: serde_json::Value,
    pub timeout_seconds: Option<u64>,
    pub retry_policy: Option<RetryPolicy>,
    /// Caller-provided id for tracing across services
    pub correlation_id: Option<Uuid>,
}

impl WorkflowRequest {
    /// Materialize an immutable definition under a freshly assigned id
    pub fn into_definition(self, workflow_id: Uuid) -> WorkflowDefinition {
        WorkflowDefinition {
            workflow_id,
            name: self.name,
            steps: self.steps,
            global_parameters: self.global_parameters,
            timeout_seconds: self.timeout_seconds,
            retry_policy: self.retry_policy,
        }
    }
}
