//! Agent registry: the runtime's in-memory table of capability handlers
//!
//! An explicit object passed by reference into the executor — never a
//! process-wide singleton. Each entry maps capability names to handlers
//! and carries a load counter. Registration takes `&mut self`; during
//! execution the registry is shared immutably, with capability lookups
//! reading concurrently and load updates serialized by a per-entry mutex.

use crate::error::EngineError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A capability implementation: takes the task input, returns an output
/// or a failure message.
pub type CapabilityHandler = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

/// Registry of executable agents
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentEntry>,
}

#[derive(Clone, Default)]
struct AgentEntry {
    capabilities: HashMap<String, CapabilityHandler>,
    load: Arc<Mutex<u32>>,
}

impl AgentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent with no capabilities yet. Re-registering an
    /// existing agent is a no-op.
    pub fn register(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.agents.contains_key(&name) {
            return;
        }
        tracing::debug!(agent = %name, "agent registered");
        self.agents.insert(name, AgentEntry::default());
    }

    /// Attach a capability handler to a registered agent
    pub fn add_capability(
        &mut self,
        agent: &str,
        capability: impl Into<String>,
        handler: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) -> Result<(), EngineError> {
        let entry = self
            .agents
            .get_mut(agent)
            .ok_or_else(|| EngineError::AgentUnavailable(agent.to_string()))?;
        entry.capabilities.insert(capability.into(), Arc::new(handler));
        Ok(())
    }

    /// Whether the agent is registered
    pub fn contains(&self, agent: &str) -> bool {
        self.agents.contains_key(agent)
    }

    /// Whether the agent is registered and supports the capability
    pub fn supports(&self, agent: &str, capability: &str) -> bool {
        self.agents
            .get(agent)
            .is_some_and(|entry| entry.capabilities.contains_key(capability))
    }

    /// Invoke a capability. The handler is looked up before invocation:
    /// a missing agent and a missing capability are distinct errors.
    pub fn invoke(&self, agent: &str, capability: &str, input: &str) -> Result<String, EngineError> {
        let entry = self
            .agents
            .get(agent)
            .ok_or_else(|| EngineError::AgentUnavailable(agent.to_string()))?;

        let handler = entry.capabilities.get(capability).ok_or_else(|| {
            EngineError::CapabilityUnsupported {
                agent: agent.to_string(),
                capability: capability.to_string(),
            }
        })?;

        handler(input).map_err(|message| EngineError::CapabilityFailed {
            agent: agent.to_string(),
            capability: capability.to_string(),
            message,
        })
    }

    /// Take a load slot on an agent (a task was routed to it)
    pub fn acquire_slot(&self, agent: &str) -> Result<(), EngineError> {
        let entry = self
            .agents
            .get(agent)
            .ok_or_else(|| EngineError::AgentUnavailable(agent.to_string()))?;
        let mut load = entry.load.lock().unwrap_or_else(PoisonError::into_inner);
        *load += 1;
        Ok(())
    }

    /// Release a load slot. Releasing on an unknown agent is a no-op.
    pub fn release_slot(&self, agent: &str) {
        if let Some(entry) = self.agents.get(agent) {
            let mut load = entry.load.lock().unwrap_or_else(PoisonError::into_inner);
            *load = load.saturating_sub(1);
        }
    }

    /// Current load counter for an agent
    pub fn current_load(&self, agent: &str) -> Option<u32> {
        self.agents
            .get(agent)
            .map(|entry| *entry.load.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Registered agent names (unordered)
    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, entry) in &self.agents {
            let mut capabilities: Vec<_> = entry.capabilities.keys().collect();
            capabilities.sort();
            map.entry(name, &capabilities);
        }
        map.finish()
    }
}
