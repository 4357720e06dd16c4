//! `chat` agent: a single request/response turn against the LLM generator.

use crate::agent_chain::collaborators::LlmGenerator;
use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{collaborator_error, require_str, AgentExecutor, ExecutorInput};
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub struct ChatExecutor {
    llm: Arc<dyn LlmGenerator>,
}

impl ChatExecutor {
    pub fn new(llm: Arc<dyn LlmGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for ChatExecutor {
    fn kind(&self) -> AgentKind {
        AgentKind::Chat
    }

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError> {
        let message = require_str(input, "message")?;
        let context: Vec<String> = input
            .get("context")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let prompt = if context.is_empty() {
            message.to_string()
        } else {
            format!("{}\n\nContext:\n{}", message, context.join("\n"))
        };

        let cancel_check = cancellation.clone();
        let reply = self
            .llm
            .generate(&prompt, cancellation)
            .await
            .map_err(|e| collaborator_error(e, &cancel_check))?;

        Ok(json!({
            "message": reply,
            "sources": context,
            "session_id": Uuid::new_v4().to_string(),
            "metadata": {},
        }))
    }
}
