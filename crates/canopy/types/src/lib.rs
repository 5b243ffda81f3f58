//! Domain types for the Canopy agent platform DSL
//!
//! A [`Program`] is the top-level container for everything a DSL source
//! file declares: agents, workflows, tasks, and completion handlers.
//! Programs are built once by the parser, annotated by the validator,
//! and read-only from then on. To change a program, re-parse the source.
//!
//! Declarations keep raw string values where the DSL carries quantities
//! as strings (`deadline: "30 minutes"`, `availability: "99.9%"`); the
//! typed accessors ([`TaskDecl::deadline`], [`ServiceLevel::availability`])
//! parse on demand and the validator guarantees they parse for a valid
//! program.

#![deny(unsafe_code)]

mod agent;
mod handler;
mod program;
mod task;
mod units;
mod workflow;

pub use agent::{AgentDecl, ServiceLevel};
pub use handler::{ActionCall, CompletionHandler};
pub use program::Program;
pub use task::{Priority, Step, StepVerb, TaskDecl};
pub use units::{parse_duration, parse_percent, UnitParseError};
pub use workflow::WorkflowDecl;
