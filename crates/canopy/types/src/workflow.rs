//! Workflow declarations: named agent groupings with a coordination policy

use serde::{Deserialize, Serialize};

/// A declared workflow
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDecl {
    /// Workflow name, unique across the program
    pub name: String,
    /// Source line of the declaration (1-based)
    pub line: usize,
    /// Participating agents, in declaration order
    pub agents: Vec<String>,
    /// Coordination-model tag, e.g. `"HCMPL_hierarchical"`
    pub coordination_model: Option<String>,
    /// Learning-mode tag, e.g. `"CALK_collaborative"`
    pub learning_mode: Option<String>,
    /// Ordered stage names
    pub stages: Vec<String>,
}

impl WorkflowDecl {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            agents: Vec::new(),
            coordination_model: None,
            learning_mode: None,
            stages: Vec::new(),
        }
    }

    /// Whether the workflow lists the given agent
    pub fn references_agent(&self, agent: &str) -> bool {
        self.agents.iter().any(|a| a == agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_agent() {
        let mut wf = WorkflowDecl::new("DataProcessingPipeline", 10);
        wf.agents = vec!["TaskScheduler".into(), "DataProcessor".into()];

        assert!(wf.references_agent("TaskScheduler"));
        assert!(!wf.references_agent("QualityController"));
    }
}
