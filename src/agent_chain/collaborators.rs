//! Abstract contracts for everything the core treats as out of scope:
//! the concrete LLM, web-search, and note/task authoring providers, plus
//! the underlying relational store. Executors and the archiver hold these
//! behind `Arc<dyn Trait>` and never know which concrete provider answers.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// A single-shot text completion provider.
#[async_trait]
pub trait LlmGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        cancellation: CancellationToken,
    ) -> Result<String, String>;
}

/// Result of a single web search collaborator call.
#[derive(Debug, Clone)]
pub struct WebSearchResult {
    pub answer: String,
    pub sources: Vec<String>,
}

/// The set of search-focus modes the distilled source supports; the
/// `focus_mode` string is validated loosely (unrecognised values are
/// passed through to the collaborator rather than rejected here, since
/// new providers may add focus modes the core doesn't know about yet).
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        focus_mode: &str,
        optimization_mode: &str,
        cancellation: CancellationToken,
    ) -> Result<WebSearchResult, String>;
}

/// Note/notebook/task authoring surface consumed by the archiver (C8) and
/// by the `note_analyzer`/`task_planner` executors.
#[async_trait]
pub trait DocumentAuthoring: Send + Sync {
    async fn create_note(
        &self,
        owner_id: uuid::Uuid,
        notebook_id: &str,
        title: &str,
    ) -> Result<String, String>;

    async fn create_notebook(
        &self,
        owner_id: uuid::Uuid,
        name: &str,
        description: &str,
    ) -> Result<String, String>;

    async fn create_block(
        &self,
        owner_id: uuid::Uuid,
        note_id: &str,
        block_type: &str,
        order: u32,
        content: &str,
        metadata: Value,
    ) -> Result<String, String>;
}

/// Deterministic test doubles for the collaborator traits above. Kept as
/// an ordinary (non-`cfg(test)`) module so both inline unit tests and the
/// crate's `tests/` integration suite can reach them.
pub mod doubles {
    use super::*;
    use std::sync::Mutex;

    /// Deterministic `LlmGenerator` double that echoes a fixed response or
    /// fails a fixed number of times before succeeding, for exercising the
    /// retry controller.
    pub struct ScriptedLlm {
        responses: Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedLlm {
        pub fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        pub fn fixed(response: impl Into<String>) -> Self {
            Self::new(vec![Ok(response.into())])
        }
    }

    #[async_trait]
    impl LlmGenerator for ScriptedLlm {
        async fn generate(
            &self,
            _prompt: &str,
            cancellation: CancellationToken,
        ) -> Result<String, String> {
            if cancellation.is_cancelled() {
                return Err("cancelled".to_string());
            }
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err("scripted responses exhausted".to_string());
            }
            if responses.len() == 1 {
                responses[0].clone()
            } else {
                responses.remove(0)
            }
        }
    }

    pub struct ScriptedSearch {
        pub answer: String,
        pub sources: Vec<String>,
    }

    #[async_trait]
    impl WebSearchProvider for ScriptedSearch {
        async fn search(
            &self,
            _query: &str,
            _focus_mode: &str,
            _optimization_mode: &str,
            _cancellation: CancellationToken,
        ) -> Result<WebSearchResult, String> {
            Ok(WebSearchResult {
                answer: self.answer.clone(),
                sources: self.sources.clone(),
            })
        }
    }

    /// No-op authoring double; records nothing, always succeeds.
    pub struct NullAuthoring;

    #[async_trait]
    impl DocumentAuthoring for NullAuthoring {
        async fn create_note(
            &self,
            _owner_id: uuid::Uuid,
            _notebook_id: &str,
            _title: &str,
        ) -> Result<String, String> {
            Ok(uuid::Uuid::new_v4().to_string())
        }

        async fn create_notebook(
            &self,
            _owner_id: uuid::Uuid,
            _name: &str,
            _description: &str,
        ) -> Result<String, String> {
            Ok(uuid::Uuid::new_v4().to_string())
        }

        async fn create_block(
            &self,
            _owner_id: uuid::Uuid,
            _note_id: &str,
            _block_type: &str,
            _order: u32,
            _content: &str,
            _metadata: Value,
        ) -> Result<String, String> {
            Ok(uuid::Uuid::new_v4().to_string())
        }
    }
}
