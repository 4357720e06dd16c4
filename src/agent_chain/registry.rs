//! C1: the only way a chain reaches a concrete agent implementation.

use crate::agent_chain::executor::AgentExecutor;
use crate::agent_chain::model::AgentKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Holds one executor per [`AgentKind`]. Lookup is read-only once
/// constructed; there is no hot-swapping of executors mid-run.
#[derive(Default)]
pub struct AgentRegistry {
    executors: HashMap<AgentKind, Arc<dyn AgentExecutor>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    pub fn register(&mut self, executor: Arc<dyn AgentExecutor>) {
        self.executors.insert(executor.kind(), executor);
    }

    pub fn get(&self, kind: AgentKind) -> Option<Arc<dyn AgentExecutor>> {
        self.executors.get(&kind).cloned()
    }

    pub fn contains(&self, kind: AgentKind) -> bool {
        self.executors.contains_key(&kind)
    }

    pub fn registered_kinds(&self) -> Vec<AgentKind> {
        self.executors.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_chain::collaborators::doubles::ScriptedLlm;
    use crate::agent_chain::executors::ReasoningExecutor;

    #[test]
    fn lookup_after_register() {
        let mut registry = AgentRegistry::new();
        assert!(!registry.contains(AgentKind::Reasoning));
        registry.register(Arc::new(ReasoningExecutor::new(Arc::new(ScriptedLlm::fixed("x")))));
        assert!(registry.contains(AgentKind::Reasoning));
        assert!(registry.get(AgentKind::Reasoning).is_some());
        assert!(registry.get(AgentKind::Chat).is_none());
    }
}
