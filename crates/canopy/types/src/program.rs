//! The top-level program: everything one DSL source file declares
//!
//! A Program is rebuilt from scratch on every parse; nothing mutates it
//! incrementally. Name uniqueness is global — agents, workflows, and
//! tasks share one namespace — and is enforced by the validator, not by
//! construction.

use crate::{AgentDecl, CompletionHandler, TaskDecl, WorkflowDecl};
use serde::{Deserialize, Serialize};

/// All declarations of one DSL source file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub agents: Vec<AgentDecl>,
    pub workflows: Vec<WorkflowDecl>,
    pub tasks: Vec<TaskDecl>,
    pub handlers: Vec<CompletionHandler>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an agent declaration by name
    pub fn agent(&self, name: &str) -> Option<&AgentDecl> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Look up a workflow declaration by name
    pub fn workflow(&self, name: &str) -> Option<&WorkflowDecl> {
        self.workflows.iter().find(|w| w.name == name)
    }

    /// Look up a task declaration by name
    pub fn task(&self, name: &str) -> Option<&TaskDecl> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Every declared name with its kind and source line, in declaration
    /// order within each kind. Used for duplicate detection and listings.
    pub fn declared_names(&self) -> impl Iterator<Item = (&str, &'static str, usize)> {
        let agents = self
            .agents
            .iter()
            .map(|a| (a.name.as_str(), "agent", a.line));
        let workflows = self
            .workflows
            .iter()
            .map(|w| (w.name.as_str(), "workflow", w.line));
        let tasks = self.tasks.iter().map(|t| (t.name.as_str(), "task", t.line));
        agents.chain(workflows).chain(tasks)
    }

    /// Whether the program declares nothing at all
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
            && self.workflows.is_empty()
            && self.tasks.is_empty()
            && self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        let mut program = Program::new();
        program.agents.push(AgentDecl::new("TaskScheduler", 3));
        program.tasks.push(TaskDecl::new("process_customer_data", 20));

        assert!(program.agent("TaskScheduler").is_some());
        assert!(program.agent("Unknown").is_none());
        assert!(program.task("process_customer_data").is_some());
        assert!(program.workflow("anything").is_none());
    }

    #[test]
    fn test_declared_names_covers_all_kinds() {
        let mut program = Program::new();
        program.agents.push(AgentDecl::new("A", 1));
        program.workflows.push(WorkflowDecl::new("W", 5));
        program.tasks.push(TaskDecl::new("T", 9));

        let names: Vec<_> = program.declared_names().collect();
        assert_eq!(
            names,
            vec![("A", "agent", 1), ("W", "workflow", 5), ("T", "task", 9)]
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(Program::new().is_empty());
    }

    #[test]
    fn test_serializes() {
        let mut program = Program::new();
        program.agents.push(AgentDecl::new("A", 1));

        let json = serde_json::to_string(&program).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(program, back);
    }
}
