use std::fmt;

/// Crate-level error for callers that do not need the structured
/// module-level taxonomies
#[derive(Debug, Clone, PartialEq)]
pub enum FlowstateError {
    EventStoreError(String),
    StateTransitionError(String),
    ReplayError(String),
    ValidationError(String),
    ConfigurationError(String),
    WebError(String),
}

impl fmt::Display for FlowstateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowstateError::EventStoreError(msg) => write!(f, "Event store error: {msg}"),
            FlowstateError::StateTransitionError(msg) => {
                write!(f, "State transition error: {msg}")
            }
            FlowstateError::ReplayError(msg) => write!(f, "Replay error: {msg}"),
            FlowstateError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            FlowstateError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            FlowstateError::WebError(msg) => write!(f, "Web error: {msg}"),
        }
    }
}

impl std::error::Error for FlowstateError {}

impl From<crate::event_store::EventStoreError> for FlowstateError {
    fn from(e: crate::event_store::EventStoreError) -> Self {
        FlowstateError::EventStoreError(e.to_string())
    }
}

impl From<crate::state_machine::StateMachineError> for FlowstateError {
    fn from(e: crate::state_machine::StateMachineError) -> Self {
        FlowstateError::StateTransitionError(e.to_string())
    }
}

impl From<crate::projection::ReplayError> for FlowstateError {
    fn from(e: crate::projection::ReplayError) -> Self {
        FlowstateError::ReplayError(e.to_string())
    }
}

impl From<crate::models::workflow_definition::DefinitionError> for FlowstateError {
    fn from(e: crate::models::workflow_definition::DefinitionError) -> Self {
        FlowstateError::ValidationError(e.to_string())
    }
}

impl From<crate::config::ConfigurationError> for FlowstateError {
    fn from(e: crate::config::ConfigurationError) -> Self {
        FlowstateError::ConfigurationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FlowstateError>;
