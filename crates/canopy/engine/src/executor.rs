//! Step interpreter: walks an execution graph against a registry
//!
//! Failure policy is fail-fast per task: the first failing step aborts the
//! task's remaining steps and is recorded as an error log entry. Deadlines
//! are checked after each step, so a step already in flight is never cut
//! short; an overrun sets `timed_out` and stops the walk.

use crate::planner::ExecutionGraph;
use crate::registry::AgentRegistry;
use crate::result::ExecutionResult;
use std::time::{Duration, Instant};

/// Run a planned task to completion, honoring its declared deadline.
pub fn execute(graph: &ExecutionGraph, registry: &AgentRegistry) -> ExecutionResult {
    execute_with_deadline(graph, registry, graph.deadline)
}

/// Run a planned task with an explicit deadline override.
pub fn execute_with_deadline(
    graph: &ExecutionGraph,
    registry: &AgentRegistry,
    deadline: Option<Duration>,
) -> ExecutionResult {
    let started = Instant::now();
    let mut result = ExecutionResult::new();
    let input = graph.input.as_deref().unwrap_or("");
    let mut routed: Vec<&str> = Vec::new();

    tracing::info!(task = %graph.task, steps = graph.steps.len(), "executing task");

    for step in &graph.steps {
        match step.verb.required_capability() {
            // Routing assigns the task; it calls no capability
            None => {
                if !registry.contains(&step.agent) {
                    result.error(format!(
                        "task {} cannot be routed: agent {} is not registered",
                        graph.task, step.agent
                    ));
                    break;
                }
                if let Err(err) = registry.acquire_slot(&step.agent) {
                    result.error(format!("task {}: {}", graph.task, err));
                    break;
                }
                routed.push(&step.agent);
                result.assigned_tasks.push(graph.task.clone());
                result.info(format!("task {} routed to {}", graph.task, step.agent));
            }
            Some(capability) => match registry.invoke(&step.agent, capability, input) {
                Ok(output) => result.info(format!(
                    "{} completed {} for task {}: {}",
                    step.agent, capability, graph.task, output
                )),
                Err(err) => {
                    result.error(format!("task {}: {}", graph.task, err));
                    break;
                }
            },
        }

        if let Some(deadline) = deadline {
            if started.elapsed() > deadline {
                result.timed_out = true;
                result.warn(format!(
                    "task {} exceeded its {:?} deadline",
                    graph.task, deadline
                ));
                break;
            }
        }
    }

    for agent in routed {
        registry.release_slot(agent);
    }

    result.elapsed = started.elapsed();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Planner;
    use canopy_dsl::parse_source;
    use canopy_types::Program;
    use std::thread;

    const SOURCE: &str = r#"
agent Dispatcher {
    capabilities: ["task_distribution"]
    max_concurrent_tasks: 10
    load_threshold: 0.8
}

agent Inspector {
    capabilities: ["validation", "data_processing"]
    max_concurrent_tasks: 5
    load_threshold: 0.5
}

task ingest {
    input: records
    priority: "high"
    deadline: "30 minutes"

    route to Dispatcher
    validate with Inspector
    process with Inspector
}
"#;

    fn program() -> Program {
        let (program, errors) = parse_source(SOURCE);
        assert!(errors.is_empty());
        program
    }

    fn full_registry() -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        registry.register("Dispatcher");
        registry.register("Inspector");
        registry
            .add_capability("Inspector", "validate", |input| Ok(format!("{} ok", input)))
            .unwrap();
        registry
            .add_capability("Inspector", "process", |input| {
                Ok(format!("{} processed", input))
            })
            .unwrap();
        registry
    }

    fn plan(registry: &AgentRegistry) -> ExecutionGraph {
        Planner::new().plan(&program(), "ingest", registry).unwrap()
    }

    #[test]
    fn test_all_steps_succeed() {
        let registry = full_registry();
        let result = execute(&plan(&registry), &registry);

        assert_eq!(result.assigned_tasks, vec!["ingest"]);
        assert_eq!(result.failed_steps(), 0);
        assert!(!result.timed_out);
        assert!(result.log[1].message.contains("records ok"));
        assert!(result.log[2].message.contains("records processed"));
        // Routed slot released after the run
        assert_eq!(registry.current_load("Dispatcher"), Some(0));
    }

    #[test]
    fn test_route_to_unregistered_agent_halts_task() {
        let mut registry = AgentRegistry::new();
        registry.register("Inspector");
        let result = execute(&plan(&registry), &registry);

        assert!(result.assigned_tasks.is_empty());
        assert_eq!(result.failed_steps(), 1);
        assert_eq!(result.log.len(), 1); // later steps never ran
        assert!(result.log[0].message.contains("Dispatcher"));
    }

    #[test]
    fn test_failing_capability_halts_remaining_steps() {
        let mut registry = AgentRegistry::new();
        registry.register("Dispatcher");
        registry.register("Inspector");
        registry
            .add_capability("Inspector", "validate", |_| Err("schema mismatch".into()))
            .unwrap();

        let result = execute(&plan(&registry), &registry);
        assert_eq!(result.assigned_tasks, vec!["ingest"]);
        assert_eq!(result.failed_steps(), 1);
        assert_eq!(result.log.len(), 2); // route + failed validate, no process
        assert!(result.log[1].message.contains("schema mismatch"));
        assert_eq!(registry.current_load("Dispatcher"), Some(0));
    }

    #[test]
    fn test_deadline_overrun_sets_timed_out() {
        let mut registry = full_registry();
        registry
            .add_capability("Inspector", "validate", |input| {
                thread::sleep(Duration::from_millis(30));
                Ok(format!("{} ok", input))
            })
            .unwrap();

        let result =
            execute_with_deadline(&plan(&registry), &registry, Some(Duration::from_millis(5)));
        assert!(result.timed_out);
        assert_eq!(result.log.last().unwrap().message, "task ingest exceeded its 5ms deadline");
        // process never ran: route, validate, warning
        assert_eq!(result.log.len(), 3);
    }

    #[test]
    fn test_load_visible_during_execution() {
        let mut registry = full_registry();
        let load_registry = registry.clone();
        registry
            .add_capability("Inspector", "validate", move |_| {
                load_registry
                    .current_load("Dispatcher")
                    .map(|load| format!("dispatcher load {}", load))
                    .ok_or_else(|| "dispatcher missing".into())
            })
            .unwrap();

        let result = execute(&plan(&registry), &registry);
        assert!(result.log[1].message.contains("dispatcher load 1"));
    }
}
