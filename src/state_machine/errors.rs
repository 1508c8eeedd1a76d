//! Structured errors for state machine evaluation.
//!
//! Every rejected transition carries enough context to explain the
//! rejection to an API caller without consulting logs.

use thiserror::Error;

/// Errors raised while validating or applying a state transition
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateMachineError {
    #[error("invalid transition: {event} is not a legal edge from {from}")]
    InvalidTransition { from: String, event: String },

    #[error("invalid step transition for '{step_id}': {event} is not a legal edge from {from}")]
    InvalidStepTransition {
        step_id: String,
        from: String,
        event: String,
    },

    #[error("unknown step: '{step_id}' is not part of the workflow definition")]
    UnknownStep { step_id: String },

    #[error("event payload is missing required field '{field}'")]
    MissingPayloadField { field: String },

    #[error("step '{step_id}' has unmet dependencies: {unmet:?}")]
    DependenciesNotSatisfied { step_id: String, unmet: Vec<String> },

    #[error("workflow cannot complete: {remaining} step(s) have not reached a satisfying status")]
    IncompleteSteps { remaining: usize },

    #[error("step '{step_id}' is already in terminal status {status}")]
    StepAlreadyTerminal { step_id: String, status: String },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

/// Build a dependency guard failure
pub fn dependencies_not_met(step_id: impl Into<String>, unmet: Vec<String>) -> StateMachineError {
    StateMachineError::DependenciesNotSatisfied {
        step_id: step_id.into(),
        unmet,
    }
}

/// Build a missing payload field error
pub fn missing_field(field: &str) -> StateMachineError {
    StateMachineError::MissingPayloadField {
        field: field.to_string(),
    }
}
