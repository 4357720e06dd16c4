//! C6: admission, lookup, and the built-in chain catalog.

use crate::agent_chain::error::CoreError;
use crate::agent_chain::model::{AgentChain, AgentDefinition, ExecutionMode};
use crate::agent_chain::persistence::ChainPersistence;
use crate::agent_chain::registry::AgentRegistry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory map of admitted chains plus a durable shadow record of each.
/// Built-in chains (`research-and-summarize`, `note-enhancement-pipeline`)
/// are served as a read-only fallback and never shadow or get shadowed by
/// a user-defined chain of the same id — user definitions simply take
/// priority.
pub struct ChainRegistry {
    agent_registry: Arc<AgentRegistry>,
    persistence: Arc<dyn ChainPersistence>,
    chains: Mutex<HashMap<String, AgentChain>>,
}

impl ChainRegistry {
    pub fn new(agent_registry: Arc<AgentRegistry>, persistence: Arc<dyn ChainPersistence>) -> Self {
        Self {
            agent_registry,
            persistence,
            chains: Mutex::new(HashMap::new()),
        }
    }

    /// Validate, assign an id if empty, persist a shadow record, and make
    /// the chain available to `load_chain_definition`.
    pub async fn create_custom_chain(&self, mut chain: AgentChain) -> Result<AgentChain, CoreError> {
        if chain.name.trim().is_empty() {
            return Err(CoreError::InvalidChain("name must not be empty".to_string()));
        }
        if chain.agents.is_empty() {
            return Err(CoreError::InvalidChain("chain must have at least one agent".to_string()));
        }
        let mut seen_ids = std::collections::HashSet::new();
        for agent in &chain.agents {
            if !self.agent_registry.contains(agent.kind) {
                return Err(CoreError::InvalidChain(format!(
                    "unknown agent kind '{}' for agent '{}'",
                    agent.kind.as_str(),
                    agent.id
                )));
            }
            if !seen_ids.insert(agent.id.clone()) {
                return Err(CoreError::InvalidChain(format!(
                    "duplicate agent id '{}' within chain",
                    agent.id
                )));
            }
        }
        if chain.id.trim().is_empty() {
            chain.id = Uuid::new_v4().to_string();
        }

        if let Err(e) = self.persistence.save_chain_shadow(&chain).await {
            log::warn!("failed to persist chain shadow record for '{}': {}", chain.id, e);
        }

        self.chains
            .lock()
            .unwrap()
            .insert(chain.id.clone(), chain.clone());
        Ok(chain)
    }

    /// Resolve a chain by id: user-defined chains first, the built-in
    /// catalog as fallback.
    pub fn load_chain_definition(&self, chain_id: &str) -> Result<AgentChain, CoreError> {
        if let Some(chain) = self.chains.lock().unwrap().get(chain_id).cloned() {
            return Ok(chain);
        }
        builtin_chain(chain_id).ok_or_else(|| CoreError::ChainNotFound(chain_id.to_string()))
    }
}

/// The two built-in chains guaranteed to resolve even if never explicitly
/// registered.
fn builtin_chain(chain_id: &str) -> Option<AgentChain> {
    use crate::agent_chain::model::AgentKind;

    let owner_id = Uuid::nil();
    match chain_id {
        "research-and-summarize" => Some(
            AgentChain::new("Research and Summarize", ExecutionMode::Sequential, owner_id)
                .with_id("research-and-summarize")
                .with_timeout_seconds(300)
                .with_agent(
                    AgentDefinition::new("search", AgentKind::WebSearch, "Web Search")
                        .with_input_mapping("query", "search_query")
                        .with_output_key("search_results"),
                )
                .with_agent(
                    AgentDefinition::new("reason", AgentKind::Reasoning, "Analysis")
                        .with_input_mapping("problem", "search_results")
                        .with_output_key("analysis"),
                )
                .with_agent(
                    AgentDefinition::new("summarize", AgentKind::Summarizer, "Summary")
                        .with_input_mapping("content", "analysis")
                        .with_output_key("summary"),
                ),
        ),
        "note-enhancement-pipeline" => Some(
            AgentChain::new("Note Enhancement Pipeline", ExecutionMode::Parallel, owner_id)
                .with_id("note-enhancement-pipeline")
                .with_timeout_seconds(180)
                .with_agent(
                    AgentDefinition::new("analyze", AgentKind::NoteAnalyzer, "Note Analysis")
                        .with_input_mapping("note_id", "note_id")
                        .with_output_key("note_analysis"),
                )
                .with_agent(
                    AgentDefinition::new("tag", AgentKind::Summarizer, "Tag Extraction")
                        .with_input_mapping("content", "note_content")
                        .with_output_key("tags"),
                )
                .with_agent(
                    AgentDefinition::new("related", AgentKind::NoteAnalyzer, "Related Notes")
                        .with_config("action", serde_json::json!("find_related"))
                        .with_input_mapping("note_id", "note_id")
                        .with_output_key("related_content"),
                ),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_chain::collaborators::doubles::{NullAuthoring, ScriptedLlm, ScriptedSearch};
    use crate::agent_chain::executors::{ReasoningExecutor, SummarizerExecutor, WebSearchExecutor};
    use crate::agent_chain::model::AgentKind;
    use crate::agent_chain::persistence::FileChainPersistence;

    fn test_registry() -> (Arc<AgentRegistry>, Arc<dyn ChainPersistence>, tempfile::TempDir) {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(ReasoningExecutor::new(Arc::new(ScriptedLlm::fixed("x")))));
        registry.register(Arc::new(SummarizerExecutor::new(Arc::new(ScriptedLlm::fixed("x")))));
        registry.register(Arc::new(WebSearchExecutor::new(Arc::new(ScriptedSearch {
            answer: "a".into(),
            sources: vec![],
        }))));
        let dir = tempfile::tempdir().unwrap();
        let persistence: Arc<dyn ChainPersistence> =
            Arc::new(FileChainPersistence::open(dir.path()).unwrap());
        (Arc::new(registry), persistence, dir)
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let (agents, persistence, _dir) = test_registry();
        let chain_registry = ChainRegistry::new(agents, persistence);
        let chain = AgentChain::new("", ExecutionMode::Sequential, Uuid::new_v4()).with_agent(
            AgentDefinition::new("a", AgentKind::Reasoning, "A"),
        );
        assert!(chain_registry.create_custom_chain(chain).await.is_err());
    }

    #[tokio::test]
    async fn rejects_unknown_agent_kind() {
        let (agents, persistence, _dir) = test_registry();
        let chain_registry = ChainRegistry::new(agents, persistence);
        let chain = AgentChain::new("c", ExecutionMode::Sequential, Uuid::new_v4()).with_agent(
            AgentDefinition::new("a", AgentKind::CodeGenerator, "A"),
        );
        assert!(chain_registry.create_custom_chain(chain).await.is_err());
    }

    #[tokio::test]
    async fn assigns_id_when_absent_and_round_trips() {
        let (agents, persistence, _dir) = test_registry();
        let chain_registry = ChainRegistry::new(agents, persistence);
        let chain = AgentChain::new("c", ExecutionMode::Sequential, Uuid::new_v4()).with_agent(
            AgentDefinition::new("a", AgentKind::Reasoning, "A"),
        );
        let admitted = chain_registry.create_custom_chain(chain).await.unwrap();
        assert!(!admitted.id.is_empty());
        let loaded = chain_registry.load_chain_definition(&admitted.id).unwrap();
        assert_eq!(loaded.id, admitted.id);
        assert_eq!(loaded.agents.len(), 1);
    }

    #[tokio::test]
    async fn builtin_chains_resolve_without_registration() {
        let (agents, persistence, _dir) = test_registry();
        let chain_registry = ChainRegistry::new(agents, persistence);
        let chain = chain_registry.load_chain_definition("research-and-summarize").unwrap();
        assert_eq!(chain.agents.len(), 3);
    }

    #[tokio::test]
    async fn unknown_chain_id_is_not_found() {
        let (agents, persistence, _dir) = test_registry();
        let chain_registry = ChainRegistry::new(agents, persistence);
        assert!(chain_registry.load_chain_definition("does-not-exist").is_err());
    }
}
