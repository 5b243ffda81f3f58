//! Execution engine for the Canopy agent platform
//!
//! Takes a validated [`Program`](canopy_types::Program) and runs it
//! against an [`AgentRegistry`]:
//!
//! - [`AgentRegistry`] maps agent names to capability handlers and tracks
//!   per-agent load
//! - [`Planner`] turns a declared task into an [`ExecutionGraph`] with
//!   per-step cost estimates
//! - [`execute`] walks a graph step by step, fail-fast per task
//! - [`Runtime`] orchestrates a whole-program run: declarations, tasks
//!   (concurrent when more than one), completion handlers
//!
//! Execution failures never panic or abort the run; they are recorded as
//! error entries in the [`ExecutionResult`] log and the rest of the run
//! proceeds.

#![deny(unsafe_code)]

mod error;
mod executor;
mod planner;
mod registry;
mod result;
mod runtime;

pub use error::{EngineError, PlanError};
pub use executor::{execute, execute_with_deadline};
pub use planner::{CostFn, ExecutionGraph, PlannedStep, Planner};
pub use registry::{AgentRegistry, CapabilityHandler};
pub use result::{ExecutionResult, LogEntry, LogLevel};
pub use runtime::Runtime;
