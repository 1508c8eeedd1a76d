//! # Data Model Layer
//!
//! Domain entities for the workflow state service: immutable definitions,
//! append-only events, and derived state snapshots.

pub mod snapshot;
pub mod workflow_definition;
pub mod workflow_event;
pub mod workflow_request;

pub use snapshot::WorkflowStateSnapshot;
pub use workflow_definition::{
    DefinitionError, RetryPolicy, StepDefinition, StepType, WorkflowDefinition,
};
pub use workflow_event::{EventType, NewWorkflowEvent, WorkflowEvent};
pub use workflow_request::WorkflowRequest;
