//! Planner: turns a declared task into an ordered execution graph
//!
//! Step order is the declaration order — the verbs are inherently
//! sequential, since `route` resolves the handling agent before
//! `validate` and `process` run. Cost estimation is an injectable
//! function of the agent's current load, so planning policy (e.g. a
//! least-loaded tie-break in a future scheduler) can change without
//! touching the planner.

use crate::error::PlanError;
use crate::registry::AgentRegistry;
use canopy_types::{Priority, Program, StepVerb};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cost scoring function: `(agent, current_load) -> estimated cost`
pub type CostFn = Box<dyn Fn(&str, u32) -> f64 + Send + Sync>;

/// The ordered, resolved sequence of steps for one task, ready to run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionGraph {
    /// Name of the planned task
    pub task: String,
    /// The input the task consumes
    pub input: Option<String>,
    pub priority: Priority,
    /// Declared deadline, if any
    pub deadline: Option<Duration>,
    /// Nodes in execution order
    pub steps: Vec<PlannedStep>,
}

/// One node of an execution graph
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub verb: StepVerb,
    pub agent: String,
    pub estimated_cost: f64,
}

/// Plans tasks against a registry
pub struct Planner {
    cost: CostFn,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    /// Planner with the default cost model: current load plus one.
    pub fn new() -> Self {
        Self::with_cost(|_, load| f64::from(load) + 1.0)
    }

    /// Planner with a custom cost model
    pub fn with_cost(cost: impl Fn(&str, u32) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            cost: Box::new(cost),
        }
    }

    /// Build the execution graph for the named task.
    ///
    /// Fails only when the task is not declared; agent availability is an
    /// execution-time concern.
    pub fn plan(
        &self,
        program: &Program,
        task_name: &str,
        registry: &AgentRegistry,
    ) -> Result<ExecutionGraph, PlanError> {
        let task = program
            .task(task_name)
            .ok_or_else(|| PlanError::UnknownTask(task_name.to_string()))?;

        let steps = task
            .steps
            .iter()
            .map(|step| {
                let load = registry.current_load(&step.agent).unwrap_or(0);
                PlannedStep {
                    verb: step.verb,
                    agent: step.agent.clone(),
                    estimated_cost: (self.cost)(&step.agent, load),
                }
            })
            .collect();

        tracing::debug!(task = %task.name, "task planned");

        Ok(ExecutionGraph {
            task: task.name.clone(),
            input: task.input.clone(),
            priority: task.priority().unwrap_or_default(),
            deadline: task.deadline(),
            steps,
        })
    }
}
