//! Execution results and the structured run log
//!
//! Every run produces an [`ExecutionResult`] whether or not steps failed.
//! Step failures and deadline overruns live in the log; callers inspect
//! `timed_out` and [`ExecutionResult::failed_steps`] to decide how the
//! run went.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Severity of a run log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One timestamped entry in the run log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// Outcome of running a program or a single task
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Unique id for this run
    pub run_id: String,
    /// Agents instantiated from declarations, in declaration order
    pub created_agents: Vec<String>,
    /// Workflows deployed from declarations, in declaration order
    pub created_workflows: Vec<String>,
    /// Tasks that completed a `route` step, in routing order
    pub assigned_tasks: Vec<String>,
    /// Chronological run log
    pub log: Vec<LogEntry>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Whether any task overran its declared deadline
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            created_agents: Vec::new(),
            created_workflows: Vec::new(),
            assigned_tasks: Vec::new(),
            log: Vec::new(),
            elapsed: Duration::ZERO,
            timed_out: false,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.log.push(LogEntry {
            timestamp: Utc::now(),
            level,
            message,
        });
    }

    /// Number of error entries in the log
    pub fn failed_steps(&self) -> usize {
        self.log
            .iter()
            .filter(|entry| entry.level == LogLevel::Error)
            .count()
    }

    /// Fold a per-task sub-result into this run's result. The sub-result's
    /// run id is discarded.
    pub fn absorb(&mut self, other: ExecutionResult) {
        self.created_agents.extend(other.created_agents);
        self.created_workflows.extend(other.created_workflows);
        self.assigned_tasks.extend(other.assigned_tasks);
        self.log.extend(other.log);
        self.timed_out |= other.timed_out;
    }
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(ExecutionResult::new().run_id, ExecutionResult::new().run_id);
    }

    #[test]
    fn test_failed_steps_counts_errors_only() {
        let mut result = ExecutionResult::new();
        result.info("agent created");
        result.warn("deadline close");
        result.error("step failed");
        result.error("another step failed");
        assert_eq!(result.failed_steps(), 2);
    }

    #[test]
    fn test_absorb_merges_in_order() {
        let mut total = ExecutionResult::new();
        total.assigned_tasks.push("first".into());
        total.info("first routed");

        let mut sub = ExecutionResult::new();
        sub.assigned_tasks.push("second".into());
        sub.timed_out = true;
        sub.error("second failed");

        total.absorb(sub);
        assert_eq!(total.assigned_tasks, vec!["first", "second"]);
        assert!(total.timed_out);
        assert_eq!(total.log.len(), 2);
        assert_eq!(total.log[1].level, LogLevel::Error);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut result = ExecutionResult::new();
        result.created_agents.push("TaskScheduler".into());
        result.info("agent TaskScheduler created");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["created_agents"][0], "TaskScheduler");
        assert_eq!(json["log"][0]["level"], "info");
        assert_eq!(json["timed_out"], false);
    }
}
