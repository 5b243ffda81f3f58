//! Validator: semantic checks over a parsed program
//!
//! Runs after parsing, before planning. Unlike the parser's per-declaration
//! recovery, validation never stops early: it walks the whole program and
//! returns every error it finds, so a caller sees the complete set at once.
//!
//! Reference resolution is two-pass — names are collected first — so
//! forward references (a task routing to an agent declared later in the
//! file) are valid.

use crate::errors::SemanticError;
use canopy_types::{parse_duration, AgentDecl, Priority, Program, TaskDecl, WorkflowDecl};
use std::collections::HashSet;

/// Validate a program, returning all semantic errors found.
pub fn validate(program: &Program) -> Vec<SemanticError> {
    let mut errors = Vec::new();

    check_duplicate_names(program, &mut errors);

    // Pass one: collect the declared agent names, so later checks can
    // resolve references regardless of declaration order.
    let agent_names: HashSet<&str> = program.agents.iter().map(|a| a.name.as_str()).collect();

    check_references(program, &agent_names, &mut errors);

    for agent in &program.agents {
        check_agent_fields(agent, &mut errors);
    }
    for workflow in &program.workflows {
        check_workflow_fields(workflow, &mut errors);
    }
    for task in &program.tasks {
        check_task_fields(task, &mut errors);
    }

    errors
}

/// Whether the program may be executed: no semantic errors at all.
pub fn is_executable(program: &Program) -> bool {
    validate(program).is_empty()
}

/// Agents, workflows, and tasks share one global namespace. One error per
/// duplicate, naming both declaration lines.
fn check_duplicate_names(program: &Program, errors: &mut Vec<SemanticError>) {
    let mut seen: Vec<(&str, &'static str, usize)> = Vec::new();

    for (name, kind, line) in program.declared_names() {
        match seen.iter().find(|(n, _, _)| *n == name) {
            Some(&(_, first_kind, first_line)) => errors.push(SemanticError::DuplicateName {
                name: name.to_string(),
                kind: first_kind.to_string(),
                first_line,
                duplicate_kind: kind.to_string(),
                duplicate_line: line,
            }),
            None => seen.push((name, kind, line)),
        }
    }
}

fn check_references(
    program: &Program,
    agent_names: &HashSet<&str>,
    errors: &mut Vec<SemanticError>,
) {
    for workflow in &program.workflows {
        for agent in &workflow.agents {
            if !agent_names.contains(agent.as_str()) {
                errors.push(SemanticError::UnknownAgent {
                    context: format!("workflow '{}'", workflow.name),
                    name: agent.clone(),
                    line: workflow.line,
                });
            }
        }
    }

    for task in &program.tasks {
        for step in &task.steps {
            if !agent_names.contains(step.agent.as_str()) {
                errors.push(SemanticError::UnknownAgent {
                    context: format!("step '{}' of task '{}'", step.verb, task.name),
                    name: step.agent.clone(),
                    line: step.line,
                });
            }
        }
    }

    for handler in &program.handlers {
        for source in &handler.sources {
            if !agent_names.contains(source.as_str()) {
                errors.push(SemanticError::UnknownAgent {
                    context: "gather block".to_string(),
                    name: source.clone(),
                    line: handler.line,
                });
            }
        }
    }
}

fn check_agent_fields(agent: &AgentDecl, errors: &mut Vec<SemanticError>) {
    let owner = format!("agent '{}'", agent.name);

    if agent.capabilities.is_empty() {
        errors.push(SemanticError::MissingField {
            owner: owner.clone(),
            field: "capabilities".into(),
            line: agent.line,
        });
    }

    match agent.load_threshold {
        None => errors.push(SemanticError::MissingField {
            owner: owner.clone(),
            field: "load_threshold".into(),
            line: agent.line,
        }),
        Some(v) if !(0.0..=1.0).contains(&v) => errors.push(SemanticError::OutOfRange {
            owner: owner.clone(),
            field: "load_threshold".into(),
            line: agent.line,
            message: format!("{} is not in [0, 1]", v),
        }),
        Some(_) => {}
    }

    // The parser already rejects non-integer values, so presence is all
    // that's left to check here; u32 covers the >= 0 range requirement.
    if agent.max_concurrent_tasks.is_none() {
        errors.push(SemanticError::MissingField {
            owner: owner.clone(),
            field: "max_concurrent_tasks".into(),
            line: agent.line,
        });
    }

    if let Some(sla) = &agent.sla {
        if let Some(Err(err)) = sla.response_time() {
            errors.push(SemanticError::InvalidValue {
                owner: owner.clone(),
                field: "sla.response_time".into(),
                line: agent.line,
                message: err.to_string(),
            });
        }
        match sla.availability() {
            Some(Err(err)) => errors.push(SemanticError::InvalidValue {
                owner: owner.clone(),
                field: "sla.availability".into(),
                line: agent.line,
                message: err.to_string(),
            }),
            Some(Ok(pct)) if !(0.0..=100.0).contains(&pct) => {
                errors.push(SemanticError::OutOfRange {
                    owner: owner.clone(),
                    field: "sla.availability".into(),
                    line: agent.line,
                    message: format!("{}% is not in [0, 100]", pct),
                })
            }
            _ => {}
        }
    }
}

fn check_workflow_fields(workflow: &WorkflowDecl, errors: &mut Vec<SemanticError>) {
    if workflow.agents.is_empty() {
        errors.push(SemanticError::MissingField {
            owner: format!("workflow '{}'", workflow.name),
            field: "agents".into(),
            line: workflow.line,
        });
    }
}

fn check_task_fields(task: &TaskDecl, errors: &mut Vec<SemanticError>) {
    let owner = format!("task '{}'", task.name);

    if task.steps.is_empty() {
        errors.push(SemanticError::EmptyTask {
            name: task.name.clone(),
            line: task.line,
        });
    }

    if let Some(raw) = task.priority.as_deref() {
        if Priority::parse(raw).is_none() {
            errors.push(SemanticError::InvalidValue {
                owner: owner.clone(),
                field: "priority".into(),
                line: task.line,
                message: format!("'{}' is not one of low, normal, high", raw),
            });
        }
    }

    if let Some(raw) = task.deadline.as_deref() {
        if let Err(err) = parse_duration(raw) {
            errors.push(SemanticError::InvalidValue {
                owner,
                field: "deadline".into(),
                line: task.line,
                message: err.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn validated(source: &str) -> Vec<SemanticError> {
        let (program, syntax_errors) = parse_source(source);
        assert!(
            syntax_errors.is_empty(),
            "unexpected syntax errors: {:?}",
            syntax_errors
        );
        validate(&program)
    }

    const VALID: &str = r#"
agent Scheduler {
    capabilities: ["task_distribution"]
    max_concurrent_tasks: 10
    load_threshold: 0.8
}

agent Checker {
    capabilities: ["validation"]
    max_concurrent_tasks: 5
    load_threshold: 0.5
}

workflow Pipeline {
    agents: [Scheduler, Checker]
}

task ingest {
    route to Scheduler
    validate with Checker
}

gather results from [Scheduler, Checker]
on completion {
    generate_report(results)
}
"#;

    #[test]
    fn test_valid_program_has_no_errors() {
        assert!(validated(VALID).is_empty());
    }

    #[test]
    fn test_duplicate_agent_name_is_one_error_with_both_lines() {
        let errors = validated(
            r#"
agent Twin {
    capabilities: ["a"]
    max_concurrent_tasks: 1
    load_threshold: 0.1
}
agent Twin {
    capabilities: ["b"]
    max_concurrent_tasks: 2
    load_threshold: 0.2
}
"#,
        );
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            SemanticError::DuplicateName {
                name,
                first_line,
                duplicate_line,
                ..
            } => {
                assert_eq!(name, "Twin");
                assert_eq!(*first_line, 2);
                assert_eq!(*duplicate_line, 7);
            }
            other => panic!("expected DuplicateName, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_across_namespaces() {
        // The namespace is global: a task may not reuse an agent's name.
        let errors = validated(
            r#"
agent thing {
    capabilities: ["a"]
    max_concurrent_tasks: 1
    load_threshold: 0.1
}
task thing {
    route to thing
}
"#,
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SemanticError::DuplicateName { .. }));
    }

    #[test]
    fn test_forward_reference_is_allowed() {
        let errors = validated(
            r#"
task early {
    route to DeclaredLater
}
agent DeclaredLater {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 0.5
}
"#,
        );
        assert!(errors.is_empty(), "errors: {:?}", errors);
    }

    #[test]
    fn test_unknown_agent_in_step_cites_the_name() {
        let errors = validated(
            r#"
agent Known {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 0.5
}
task t {
    route to Phantom
}
"#,
        );
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            SemanticError::UnknownAgent { name, context, .. } => {
                assert_eq!(name, "Phantom");
                assert!(context.contains("route"));
            }
            other => panic!("expected UnknownAgent, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_agent_in_workflow_and_gather() {
        let errors = validated(
            r#"
agent Known {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 0.5
}
workflow w {
    agents: [Known, Ghost]
}
gather r from [Specter]
on completion {
    log(r)
}
"#,
        );
        assert_eq!(errors.len(), 2);
        let names: Vec<_> = errors
            .iter()
            .map(|e| match e {
                SemanticError::UnknownAgent { name, .. } => name.as_str(),
                other => panic!("unexpected error {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["Ghost", "Specter"]);
    }

    #[test]
    fn test_load_threshold_out_of_range() {
        let errors = validated(
            r#"
agent Hot {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 1.5
}
"#,
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SemanticError::OutOfRange { .. }));
    }

    #[test]
    fn test_missing_required_agent_fields() {
        let errors = validated("agent Bare { }");
        let fields: Vec<_> = errors
            .iter()
            .map(|e| match e {
                SemanticError::MissingField { field, .. } => field.as_str(),
                other => panic!("unexpected error {:?}", other),
            })
            .collect();
        assert_eq!(
            fields,
            vec!["capabilities", "load_threshold", "max_concurrent_tasks"]
        );
    }

    #[test]
    fn test_workflow_without_agents() {
        let errors = validated("workflow hollow { }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            SemanticError::MissingField { ref field, .. } if field == "agents"
        ));
    }

    #[test]
    fn test_task_without_steps() {
        let errors = validated("task idle { input: nothing }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SemanticError::EmptyTask { .. }));
    }

    #[test]
    fn test_invalid_priority_and_deadline() {
        let errors = validated(
            r#"
agent A {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 0.5
}
task t {
    priority: "urgent"
    deadline: "whenever"
    route to A
}
"#,
        );
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            SemanticError::InvalidValue { ref field, .. } if field == "priority"
        ));
        assert!(matches!(
            errors[1],
            SemanticError::InvalidValue { ref field, .. } if field == "deadline"
        ));
    }

    #[test]
    fn test_invalid_sla_values() {
        let errors = validated(
            r#"
agent A {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 0.5
    sla: {
        response_time: "eventually"
        availability: "120%"
    }
}
"#,
        );
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            SemanticError::InvalidValue { ref field, .. } if field == "sla.response_time"
        ));
        assert!(matches!(
            errors[1],
            SemanticError::OutOfRange { ref field, .. } if field == "sla.availability"
        ));
    }

    #[test]
    fn test_all_errors_collected_in_one_pass() {
        let errors = validated(
            r#"
agent A {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 2.0
}
task t {
    route to Missing
}
task empty { }
"#,
        );
        // Range violation + unknown reference + empty task, all at once
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_order_independence() {
        // Shuffled declaration order: same verdict, same error kinds.
        let forward = validated(
            r#"
task t {
    route to Missing
}
agent A {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 0.5
}
"#,
        );
        let backward = validated(
            r#"
agent A {
    capabilities: ["x"]
    max_concurrent_tasks: 1
    load_threshold: 0.5
}
task t {
    route to Missing
}
"#,
        );
        assert_eq!(forward.len(), backward.len());
        match (&forward[0], &backward[0]) {
            (
                SemanticError::UnknownAgent { name: a, .. },
                SemanticError::UnknownAgent { name: b, .. },
            ) => assert_eq!(a, b),
            other => panic!("expected matching UnknownAgent errors, got {:?}", other),
        }
    }

    #[test]
    fn test_is_executable() {
        let (program, _) = parse_source(VALID);
        assert!(is_executable(&program));

        let (broken, _) = parse_source("task empty { }");
        assert!(!is_executable(&broken));
    }
}
