//! `web_search` agent: delegates to the web search collaborator.

use crate::agent_chain::collaborators::WebSearchProvider;
use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{collaborator_error, require_str, AgentExecutor, ExecutorInput};
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct WebSearchExecutor {
    search: Arc<dyn WebSearchProvider>,
}

impl WebSearchExecutor {
    pub fn new(search: Arc<dyn WebSearchProvider>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl AgentExecutor for WebSearchExecutor {
    fn kind(&self) -> AgentKind {
        AgentKind::WebSearch
    }

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError> {
        let query = require_str(input, "query")?;
        let max_results = input.get("max_results").and_then(Value::as_u64).unwrap_or(5);
        let focus_mode = input
            .get("focus_mode")
            .and_then(Value::as_str)
            .unwrap_or("webSearch");
        let optimization_mode = input
            .get("optimization_mode")
            .and_then(Value::as_str)
            .unwrap_or("balanced");

        let cancel_check = cancellation.clone();
        let result = self
            .search
            .search(query, focus_mode, optimization_mode, cancellation)
            .await
            .map_err(|e| collaborator_error(e, &cancel_check))?;

        let results: Vec<&String> = result.sources.iter().take(max_results as usize).collect();

        Ok(json!({
            "query": query,
            "results": results,
            "sources": result.sources,
            "answer": result.answer,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_chain::collaborators::doubles::ScriptedSearch;
    use serde_json::Map;

    #[tokio::test]
    async fn requires_query() {
        let exec = WebSearchExecutor::new(Arc::new(ScriptedSearch {
            answer: "a".into(),
            sources: vec![],
        }));
        assert!(exec.execute(CancellationToken::new(), &Map::new()).await.is_err());
    }

    #[tokio::test]
    async fn truncates_to_max_results() {
        let exec = WebSearchExecutor::new(Arc::new(ScriptedSearch {
            answer: "a".into(),
            sources: vec!["1".into(), "2".into(), "3".into()],
        }));
        let mut input = Map::new();
        input.insert("query".into(), json!("quantum error correction"));
        input.insert("max_results".into(), json!(2));
        let out = exec.execute(CancellationToken::new(), &input).await.unwrap();
        assert_eq!(out["results"].as_array().unwrap().len(), 2);
        assert_eq!(out["sources"].as_array().unwrap().len(), 3);
    }
}
