//! `note_analyzer` agent: analyzes a note, finds related notes, or
//! extracts entities, depending on `action`.
//!
//! Both `analyze` and `find_related` return the same
//! [`NoteAnalysis`](self)-shaped object, with action-specific fields
//! populated and the rest left at their defaults, rather than two
//! structurally distinct response shapes — see the design ledger for why.

use crate::agent_chain::collaborators::LlmGenerator;
use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{
    collaborator_error, optional_str, require_str, AgentExecutor, ExecutorInput,
};
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct NoteAnalyzerExecutor {
    llm: Arc<dyn LlmGenerator>,
}

impl NoteAnalyzerExecutor {
    pub fn new(llm: Arc<dyn LlmGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for NoteAnalyzerExecutor {
    fn kind(&self) -> AgentKind {
        AgentKind::NoteAnalyzer
    }

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError> {
        let note_id = require_str(input, "note_id")?;
        let action = optional_str(input, "action", "analyze");
        let cancel_check = cancellation.clone();

        match action {
            "analyze" => {
                let prompt = format!("Analyze note {} and summarize its key points.", note_id);
                let analysis = self
                    .llm
                    .generate(&prompt, cancellation)
                    .await
                    .map_err(|e| collaborator_error(e, &cancel_check))?;
                Ok(json!({
                    "note_id": note_id,
                    "action": action,
                    "analysis": analysis,
                    "related_notes": [],
                    "entities": [],
                }))
            }
            "find_related" => {
                let prompt = format!("List notes related to {}.", note_id);
                let related = self
                    .llm
                    .generate(&prompt, cancellation)
                    .await
                    .map_err(|e| collaborator_error(e, &cancel_check))?;
                Ok(json!({
                    "note_id": note_id,
                    "action": action,
                    "analysis": "",
                    "related_notes": [related],
                    "entities": [],
                }))
            }
            "extract_entities" => {
                let prompt = format!("Extract named entities from note {}.", note_id);
                let entities = self
                    .llm
                    .generate(&prompt, cancellation)
                    .await
                    .map_err(|e| collaborator_error(e, &cancel_check))?;
                Ok(json!({
                    "note_id": note_id,
                    "action": action,
                    "analysis": "",
                    "related_notes": [],
                    "entities": [entities],
                }))
            }
            other => Err(CoreError::InvalidInput(format!(
                "unsupported note_analyzer action '{}'",
                other
            ))),
        }
    }
}
