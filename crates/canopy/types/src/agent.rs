//! Agent declarations: named units of work assignment
//!
//! An agent declares what it can do (`capabilities`) and how much it can
//! take on (`max_concurrent_tasks`, `load_threshold`). The declaration is
//! metadata only — which capabilities actually have executable handlers is
//! decided by the runtime's registry, not here.

use crate::units::{parse_duration, parse_percent, UnitParseError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A declared agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentDecl {
    /// Agent name, unique across the program
    pub name: String,
    /// Source line of the declaration (1-based)
    pub line: usize,
    /// Declared capability names, in declaration order
    pub capabilities: Vec<String>,
    /// Upper bound on simultaneously assigned tasks
    pub max_concurrent_tasks: Option<u32>,
    /// Load fraction in [0, 1] above which the agent is considered saturated
    pub load_threshold: Option<f64>,
    /// Optional service-level declaration
    pub sla: Option<ServiceLevel>,
    /// Names of services this agent depends on, in declaration order
    pub dependencies: Vec<String>,
}

impl AgentDecl {
    /// Create a bare declaration; fields are filled in by the parser
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            capabilities: Vec::new(),
            max_concurrent_tasks: None,
            load_threshold: None,
            sla: None,
            dependencies: Vec::new(),
        }
    }

    /// Whether the declaration lists the given capability
    pub fn declares_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Service-level declaration attached to an agent
///
/// Values are kept as the raw DSL strings; the accessors parse them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevel {
    /// e.g. `"100ms"`
    pub response_time: Option<String>,
    /// e.g. `"99.9%"`
    pub availability: Option<String>,
    /// Free-form, e.g. `"1000 tasks/minute"`
    pub throughput: Option<String>,
}

impl ServiceLevel {
    /// Parsed response time, if declared
    pub fn response_time(&self) -> Option<Result<Duration, UnitParseError>> {
        self.response_time.as_deref().map(parse_duration)
    }

    /// Parsed availability percentage, if declared
    pub fn availability(&self) -> Option<Result<f64, UnitParseError>> {
        self.availability.as_deref().map(parse_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declares_capability() {
        let mut agent = AgentDecl::new("QualityController", 1);
        agent.capabilities = vec!["validation".into(), "error_handling".into()];

        assert!(agent.declares_capability("validation"));
        assert!(!agent.declares_capability("stream_processing"));
    }

    #[test]
    fn test_service_level_accessors() {
        let sla = ServiceLevel {
            response_time: Some("100ms".into()),
            availability: Some("99.9%".into()),
            throughput: Some("1000 tasks/minute".into()),
        };

        assert_eq!(
            sla.response_time().unwrap().unwrap(),
            Duration::from_millis(100)
        );
        assert_eq!(sla.availability().unwrap().unwrap(), 99.9);
    }

    #[test]
    fn test_service_level_invalid_values_surface() {
        let sla = ServiceLevel {
            response_time: Some("fast".into()),
            availability: None,
            throughput: None,
        };

        assert!(sla.response_time().unwrap().is_err());
        assert!(sla.availability().is_none());
    }
}
