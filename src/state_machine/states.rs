use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level workflow state definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Initial state when the workflow is created
    Pending,
    /// Workflow is currently executing steps
    Active,
    /// Workflow execution is suspended and may be resumed
    Paused,
    /// Workflow completed successfully
    Completed,
    /// Workflow failed with an error
    Failed,
    /// Workflow was cancelled
    Cancelled,
}

impl WorkflowState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Check if this is an active state (workflow is being processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Check if step-level events are accepted in this state
    pub fn accepts_step_events(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid workflow state: {s}")),
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Pending
    }
}

/// Execution sub-states, present only while the workflow is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionSubstate {
    /// Workflow has started but no step has progressed yet
    Initializing,
    /// At least one step is running
    Executing,
    /// No step is running and non-terminal steps remain
    Waiting,
    /// A synchronization step is running
    Synchronizing,
    /// Every step reached a terminal status
    Finalizing,
}

impl fmt::Display for ExecutionSubstate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Executing => write!(f, "executing"),
            Self::Waiting => write!(f, "waiting"),
            Self::Synchronizing => write!(f, "synchronizing"),
            Self::Finalizing => write!(f, "finalizing"),
        }
    }
}

impl std::str::FromStr for ExecutionSubstate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initializing" => Ok(Self::Initializing),
            "executing" => Ok(Self::Executing),
            "waiting" => Ok(Self::Waiting),
            "synchronizing" => Ok(Self::Synchronizing),
            "finalizing" => Ok(Self::Finalizing),
            _ => Err(format!("Invalid execution substate: {s}")),
        }
    }
}

/// Per-instance step status definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Initial status when the step instance is created
    Pending,
    /// Step is currently being executed
    Running,
    /// Step completed successfully
    Completed,
    /// Step failed with an error
    Failed,
    /// Step was skipped (conditional branch not taken)
    Skipped,
    /// Step was cancelled
    Cancelled,
}

impl StepStatus {
    /// Check if this is a terminal status (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Skipped | Self::Cancelled
        )
    }

    /// Check if this is an active status (step is being processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Check if this status satisfies dependencies for downstream steps
    pub fn satisfies_dependencies(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_state_terminal_check() {
        assert!(WorkflowState::Completed.is_terminal());
        assert!(WorkflowState::Failed.is_terminal());
        assert!(WorkflowState::Cancelled.is_terminal());
        assert!(!WorkflowState::Pending.is_terminal());
        assert!(!WorkflowState::Active.is_terminal());
        assert!(!WorkflowState::Paused.is_terminal());
    }

    #[test]
    fn test_step_status_dependency_satisfaction() {
        assert!(StepStatus::Completed.satisfies_dependencies());
        assert!(StepStatus::Skipped.satisfies_dependencies());
        assert!(!StepStatus::Pending.satisfies_dependencies());
        assert!(!StepStatus::Running.satisfies_dependencies());
        assert!(!StepStatus::Failed.satisfies_dependencies());
        assert!(!StepStatus::Cancelled.satisfies_dependencies());
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(WorkflowState::Active.to_string(), "active");
        assert_eq!(
            "completed".parse::<WorkflowState>().unwrap(),
            WorkflowState::Completed
        );

        assert_eq!(
            ExecutionSubstate::Synchronizing.to_string(),
            "synchronizing"
        );
        assert_eq!(
            "waiting".parse::<ExecutionSubstate>().unwrap(),
            ExecutionSubstate::Waiting
        );

        assert_eq!(StepStatus::Running.to_string(), "running");
        assert_eq!("skipped".parse::<StepStatus>().unwrap(), StepStatus::Skipped);
    }

    #[test]
    fn test_state_serde() {
        let state = WorkflowState::Active;
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "\"active\"");

        let parsed: WorkflowState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);

        let substate = ExecutionSubstate::Initializing;
        assert_eq!(
            serde_json::to_string(&substate).unwrap(),
            "\"initializing\""
        );
    }
}
