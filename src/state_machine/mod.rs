// State machine module for workflow lifecycle management
//
// Transition tables and guards for the hierarchical workflow state
// machine: six top-level states, five execution substates while active,
// and six per-step statuses. Everything here is pure and synchronous so
// the same code path drives both pre-append validation and log replay.

pub mod errors;
pub mod guards;
pub mod states;
pub mod step_state_machine;
pub mod workflow_state_machine;

// Re-export main types for convenient access
pub use errors::{StateMachineError, StateMachineResult};
pub use states::{ExecutionSubstate, StepStatus, WorkflowState};
pub use step_state_machine::determine_step_target;
pub use workflow_state_machine::{derive_substate, determine_target_state};

// Common traits and utilities
pub use guards::{
    AllStepsSatisfiedGuard, StateGuard, StepDependenciesMetGuard, StepNotTerminalGuard,
};
