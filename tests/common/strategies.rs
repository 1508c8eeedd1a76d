use flowstate_core::models::{StepDefinition, StepType, WorkflowDefinition};
use proptest::prelude::*;
use uuid::Uuid;

/// Shapes of dependency graphs worth generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowShape {
    /// s0 -> s1 -> ... -> sN
    Linear(usize),
    /// A root, N parallel branches, and a synchronization join
    FanOutFanIn(usize),
    /// N steps with no dependencies at all
    Independent(usize),
}

impl WorkflowShape {
    pub fn step_count(&self) -> usize {
        match self {
            Self::Linear(n) | Self::Independent(n) => *n,
            Self::FanOutFanIn(n) => n + 2,
        }
    }

    /// Materialize the shape as a validated workflow definition
    pub fn build(&self) -> WorkflowDefinition {
        let steps = match self {
            Self::Linear(n) => (0..*n)
                .map(|i| StepDefinition {
                    step_id: format!("s{i}"),
                    name: format!("step {i}"),
                    step_type: StepType::Sequential,
                    dependencies: if i == 0 {
                        vec![]
                    } else {
                        vec![format!("s{}", i - 1)]
                    },
                    parameters: serde_json::json!({}),
                })
                .collect(),
            Self::Independent(n) => (0..*n)
                .map(|i| StepDefinition {
                    step_id: format!("s{i}"),
                    name: format!("step {i}"),
                    step_type: StepType::Parallel,
                    dependencies: vec![],
                    parameters: serde_json::json!({}),
                })
                .collect(),
            Self::FanOutFanIn(n) => {
                let mut steps = vec![StepDefinition {
                    step_id: "root".to_string(),
                    name: "root".to_string(),
                    step_type: StepType::Sequential,
                    dependencies: vec![],
                    parameters: serde_json::json!({}),
                }];
                for i in 0..*n {
                    steps.push(StepDefinition {
                        step_id: format!("branch{i}"),
                        name: format!("branch {i}"),
                        step_type: StepType::Parallel,
                        dependencies: vec!["root".to_string()],
                        parameters: serde_json::json!({}),
                    });
                }
                steps.push(StepDefinition {
                    step_id: "join".to_string(),
                    name: "join".to_string(),
                    step_type: StepType::Synchronization,
                    dependencies: (0..*n).map(|i| format!("branch{i}")).collect(),
                    parameters: serde_json::json!({}),
                });
                steps
            }
        };

        let definition = WorkflowDefinition {
            workflow_id: Uuid::new_v4(),
            name: format!("{self:?}"),
            steps,
            global_parameters: serde_json::json!({}),
            timeout_seconds: None,
            retry_policy: None,
        };
        definition
            .validate()
            .expect("generated shapes must be valid DAGs");
        definition
    }
}

/// Strategy over the shapes above
pub fn workflow_shape_strategy() -> impl Strategy<Value = WorkflowShape> {
    prop_oneof![
        (1usize..6).prop_map(WorkflowShape::Linear),
        (2usize..5).prop_map(WorkflowShape::FanOutFanIn),
        (1usize..5).prop_map(WorkflowShape::Independent),
    ]
}

/// Strategy for validated workflow definitions
pub fn definition_strategy() -> impl Strategy<Value = WorkflowDefinition> {
    workflow_shape_strategy().prop_map(|shape| shape.build())
}

/// Strategy pairing a definition with per-step skip decisions
pub fn script_strategy() -> impl Strategy<Value = (WorkflowDefinition, Vec<bool>)> {
    definition_strategy().prop_flat_map(|definition| {
        let steps = definition.steps.len();
        (
            Just(definition),
            prop::collection::vec(any::<bool>(), steps),
        )
    })
}
