//! # Workflow Definitions
//!
//! Immutable workflow templates: an ordered list of step definitions with
//! a dependency DAG, global parameters, and optional timeout/retry policy.
//! A definition is validated once at authoring time and never mutated after
//! a workflow instance starts.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use uuid::Uuid;

/// Classification of a step within the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// Runs after its dependencies, one unit of work
    Sequential,
    /// May run concurrently with sibling parallel steps
    Parallel,
    /// Executed only when its condition holds, otherwise skipped
    Conditional,
    /// Re-enters until its loop condition is exhausted
    Loop,
    /// Barrier step that joins parallel branches
    Synchronization,
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
            Self::Conditional => write!(f, "conditional"),
            Self::Loop => write!(f, "loop"),
            Self::Synchronization => write!(f, "synchronization"),
        }
    }
}

/// Retry behavior applied to failed steps by executing agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_seconds: u64,
}

/// A named unit of work within a workflow definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub step_id: String,
    pub name: String,
    pub step_type: StepType,
    /// Step ids that must reach a satisfying status before this step starts
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Immutable workflow template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub workflow_id: Uuid,
    pub name: String,
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub global_parameters: serde_json::Value,
    pub timeout_seconds: Option<u64>,
    pub retry_policy: Option<RetryPolicy>,
}

/// Validation failures for workflow definitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("workflow name must not be empty")]
    EmptyName,

    #[error("workflow must declare at least one step")]
    NoSteps,

    #[error("step id must not be empty")]
    EmptyStepId,

    #[error("duplicate step id: '{0}'")]
    DuplicateStep(String),

    #[error("step '{step_id}' depends on unknown step '{dependency}'")]
    UnknownDependency { step_id: String, dependency: String },

    #[error("step '{0}' depends on itself")]
    SelfDependency(String),

    #[error("dependency cycle detected involving steps: {0:?}")]
    DependencyCycle(Vec<String>),
}

impl WorkflowDefinition {
    /// Look up a step definition by id
    pub fn step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Validate structural invariants before any event is appended.
    ///
    /// Checks: non-empty name, at least one step, unique step ids, every
    /// dependency resolves to a declared step, and the dependency graph
    /// is acyclic.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if self.steps.is_empty() {
            return Err(DefinitionError::NoSteps);
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.step_id.trim().is_empty() {
                return Err(DefinitionError::EmptyStepId);
            }
            if !seen.insert(step.step_id.as_str()) {
                return Err(DefinitionError::DuplicateStep(step.step_id.clone()));
            }
        }

        for step in &self.steps {
            for dep in &step.dependencies {
                if dep == &step.step_id {
                    return Err(DefinitionError::SelfDependency(step.step_id.clone()));
                }
                if !seen.contains(dep.as_str()) {
                    return Err(DefinitionError::UnknownDependency {
                        step_id: step.step_id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        self.check_acyclic()
    }

    /// Kahn's algorithm over the dependency edges; leftover nodes form a cycle
    fn check_acyclic(&self) -> Result<(), DefinitionError> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for step in &self.steps {
            in_degree.entry(step.step_id.as_str()).or_insert(0);
            for dep in &step.dependencies {
                *in_degree.entry(step.step_id.as_str()).or_insert(0) += 1;
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(step.step_id.as_str());
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut visited = 0usize;
        while let Some(id) = queue.pop_front() {
            visited += 1;
            if let Some(children) = dependents.get(id) {
                for child in children {
                    let degree = in_degree
                        .get_mut(child)
                        .map(|d| {
                            *d -= 1;
                            *d
                        })
                        .unwrap_or(0);
                    if degree == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }

        if visited == self.steps.len() {
            Ok(())
        } else {
            let mut remaining: Vec<String> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(id, _)| (*id).to_string())
                .collect();
            remaining.sort();
            Err(DefinitionError::DependencyCycle(remaining))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, deps: &[&str]) -> StepDefinition {
        StepDefinition {
            step_id: id.to_string(),
            name: format!("step {id}"),
            step_type: StepType::Sequential,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            parameters: serde_json::json!({}),
        }
    }

    fn definition(steps: Vec<StepDefinition>) -> WorkflowDefinition {
        WorkflowDefinition {
            workflow_id: Uuid::new_v4(),
            name: "test workflow".to_string(),
            steps,
            global_parameters: serde_json::json!({}),
            timeout_seconds: None,
            retry_policy: None,
        }
    }

    #[test]
    fn test_valid_linear_definition() {
        let def = definition(vec![step("a", &[]), step("b", &["a"]), step("c", &["b"])]);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_diamond_definition_is_acyclic() {
        let def = definition(vec![
            step("a", &[]),
            step("b", &["a"]),
            step("c", &["a"]),
            step("d", &["b", "c"]),
        ]);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicate_step_ids() {
        let def = definition(vec![step("a", &[]), step("a", &[])]);
        assert_eq!(
            def.validate(),
            Err(DefinitionError::DuplicateStep("a".to_string()))
        );
    }

    #[test]
    fn test_rejects_unknown_dependency() {
        let def = definition(vec![step("a", &["ghost"])]);
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_rejects_self_dependency() {
        let def = definition(vec![step("a", &["a"])]);
        assert_eq!(
            def.validate(),
            Err(DefinitionError::SelfDependency("a".to_string()))
        );
    }

    #[test]
    fn test_rejects_cycle() {
        let def = definition(vec![step("a", &["c"]), step("b", &["a"]), step("c", &["b"])]);
        match def.validate() {
            Err(DefinitionError::DependencyCycle(nodes)) => {
                assert_eq!(nodes, vec!["a", "b", "c"]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_empty_definition() {
        let def = definition(vec![]);
        assert_eq!(def.validate(), Err(DefinitionError::NoSteps));
    }

    #[test]
    fn test_step_lookup() {
        let def = definition(vec![step("a", &[]), step("b", &["a"])]);
        assert!(def.step("a").is_some());
        assert!(def.step("missing").is_none());
    }
}
