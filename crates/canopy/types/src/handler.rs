//! Completion handlers: `gather ... from [...] on completion { ... }`

use serde::{Deserialize, Serialize};

/// A gather/on-completion block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionHandler {
    /// The identifier the gathered results are bound to (`gather results ...`)
    pub binding: String,
    /// Source line of the block (1-based)
    pub line: usize,
    /// Agents whose results are gathered
    pub sources: Vec<String>,
    /// Action calls to run on completion, in declaration order
    pub actions: Vec<ActionCall>,
}

/// One action call inside an on-completion block, e.g. `generate_report(results)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
    pub name: String,
    /// Literal arguments, rendered back to their source text
    pub args: Vec<String>,
}

impl std::fmt::Display for ActionCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}
