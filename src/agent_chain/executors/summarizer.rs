//! `summarizer` agent: condenses `content` (or `data`, stringified) to the
//! requested style and length.

use crate::agent_chain::collaborators::LlmGenerator;
use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{collaborator_error, optional_u64, AgentExecutor, ExecutorInput};
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const STYLES: &[&str] = &["concise", "bullet", "executive", "technical", "detailed"];

pub struct SummarizerExecutor {
    llm: Arc<dyn LlmGenerator>,
}

impl SummarizerExecutor {
    pub fn new(llm: Arc<dyn LlmGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for SummarizerExecutor {
    fn kind(&self) -> AgentKind {
        AgentKind::Summarizer
    }

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError> {
        let content = match input.get("content").and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => match input.get("data") {
                Some(v) => v.to_string(),
                None => {
                    return Err(CoreError::InvalidInput(
                        "missing required input 'content'".to_string(),
                    ))
                }
            },
        };
        let style = input
            .get("style")
            .and_then(Value::as_str)
            .filter(|s| STYLES.contains(s))
            .unwrap_or("concise");
        let max_length = optional_u64(input, "max_length", 500);

        let cancel_check = cancellation.clone();
        let prompt = format!(
            "Summarize the following content in a {} style, at most {} characters:\n\n{}",
            style, max_length, content
        );
        let summary = self
            .llm
            .generate(&prompt, cancellation)
            .await
            .map_err(|e| collaborator_error(e, &cancel_check))?;

        Ok(json!({
            "summary": summary,
            "style": style,
            "original_length": content.chars().count(),
            "summary_length": summary.chars().count(),
        }))
    }
}
