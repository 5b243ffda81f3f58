//! DSL front end for the Canopy agent platform
//!
//! Turns declarative source text into a validated [`Program`]:
//!
//! ```text
//! agent TaskScheduler {
//!     capabilities: ["task_distribution", "load_balancing"]
//!     max_concurrent_tasks: 50
//!     load_threshold: 0.85
//! }
//!
//! task process_customer_data {
//!     input: customer_dataset
//!     priority: "high"
//!     deadline: "30 minutes"
//!
//!     route to TaskScheduler
//! }
//! ```
//!
//! The pipeline is `tokenize → parse → validate`. Every stage reports
//! problems as data rather than aborting: the lexer emits Unknown tokens
//! for characters it cannot classify, the parser records a
//! [`SyntaxError`] per malformed declaration and recovers at the next
//! top-level keyword, and the validator returns the complete
//! [`SemanticError`] set in one pass. A program with any semantic error
//! must not be executed.
//!
//! # Usage
//!
//! ```rust
//! use canopy_dsl::{parse_source, validate};
//!
//! let source = r#"
//! agent Scheduler {
//!     capabilities: ["task_distribution"]
//!     max_concurrent_tasks: 10
//!     load_threshold: 0.8
//! }
//!
//! task ingest {
//!     route to Scheduler
//! }
//! "#;
//!
//! let (program, syntax_errors) = parse_source(source);
//! assert!(syntax_errors.is_empty());
//! assert_eq!(program.agents.len(), 1);
//! assert!(validate(&program).is_empty());
//! ```

#![deny(unsafe_code)]

mod errors;
mod lexer;
mod parser;
mod validator;

pub use errors::{SemanticError, SyntaxError};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use parser::{parse, parse_source};
pub use validator::{is_executable, validate};
