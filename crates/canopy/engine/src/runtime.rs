//! Runtime: whole-program orchestration
//!
//! A run instantiates every declared agent and workflow, executes every
//! declared task (concurrently when there is more than one, against the
//! shared registry), then fires the completion handlers. Per-task logs are
//! merged back in declaration order so the run log reads deterministically
//! even when tasks raced.

use crate::error::PlanError;
use crate::executor::execute;
use crate::planner::Planner;
use crate::registry::AgentRegistry;
use crate::result::ExecutionResult;
use canopy_types::Program;
use std::time::Instant;

/// Orchestrates program runs
#[derive(Default)]
pub struct Runtime {
    planner: Planner,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            planner: Planner::new(),
        }
    }

    /// Runtime with a custom planner (e.g. a different cost model)
    pub fn with_planner(planner: Planner) -> Self {
        Self { planner }
    }

    /// Run the whole program: declarations, tasks, completion handlers.
    pub fn run(&self, program: &Program, registry: &AgentRegistry) -> ExecutionResult {
        let started = Instant::now();
        let mut result = ExecutionResult::new();

        tracing::info!(
            run_id = %result.run_id,
            agents = program.agents.len(),
            workflows = program.workflows.len(),
            tasks = program.tasks.len(),
            "starting run"
        );

        for agent in &program.agents {
            result.created_agents.push(agent.name.clone());
            result.info(format!(
                "agent {} created with {} capabilities",
                agent.name,
                agent.capabilities.len()
            ));
        }

        for workflow in &program.workflows {
            result.created_workflows.push(workflow.name.clone());
            result.info(format!(
                "workflow {} deployed coordinating {} agents",
                workflow.name,
                workflow.agents.len()
            ));
        }

        // UnknownTask cannot occur for names taken from the program itself
        let graphs: Vec<_> = program
            .tasks
            .iter()
            .filter_map(|task| self.planner.plan(program, &task.name, registry).ok())
            .collect();

        match graphs.len() {
            0 => {}
            1 => result.absorb(execute(&graphs[0], registry)),
            _ => std::thread::scope(|scope| {
                let handles: Vec<_> = graphs
                    .iter()
                    .map(|graph| {
                        (graph.task.clone(), scope.spawn(move || execute(graph, registry)))
                    })
                    .collect();
                for (task, handle) in handles {
                    match handle.join() {
                        Ok(sub) => result.absorb(sub),
                        Err(_) => result.error(format!("task {} aborted unexpectedly", task)),
                    }
                }
            }),
        }

        for handler in &program.handlers {
            result.info(format!(
                "gathered results from [{}] into {}",
                handler.sources.join(", "),
                handler.binding
            ));
            for action in &handler.actions {
                result.info(format!("completion action {}", action));
            }
        }

        result.elapsed = started.elapsed();
        tracing::info!(
            run_id = %result.run_id,
            assigned = result.assigned_tasks.len(),
            failed_steps = result.failed_steps(),
            timed_out = result.timed_out,
            "run finished"
        );
        result
    }

    /// Plan and run a single declared task.
    pub fn run_task(
        &self,
        program: &Program,
        task_name: &str,
        registry: &AgentRegistry,
    ) -> Result<ExecutionResult, PlanError> {
        let graph = self.planner.plan(program, task_name, registry)?;
        Ok(execute(&graph, registry))
    }
}
