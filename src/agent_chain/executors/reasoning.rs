//! `reasoning` agent: hands a problem statement to the LLM generator under
//! one of several reasoning strategies.

use crate::agent_chain::collaborators::LlmGenerator;
use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{collaborator_error, require_str, AgentExecutor, ExecutorInput};
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const STRATEGIES: &[&str] = &[
    "methodical",
    "exploratory",
    "focused",
    "multi_strategy",
    "quick",
    "balanced",
    "comprehensive",
];

pub struct ReasoningExecutor {
    llm: Arc<dyn LlmGenerator>,
}

impl ReasoningExecutor {
    pub fn new(llm: Arc<dyn LlmGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for ReasoningExecutor {
    fn kind(&self) -> AgentKind {
        AgentKind::Reasoning
    }

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError> {
        let problem = require_str(input, "problem")?;
        let strategy = input
            .get("strategy")
            .and_then(Value::as_str)
            .filter(|s| STRATEGIES.contains(s))
            .unwrap_or("multi_strategy");
        let max_iterations = input
            .get("max_iterations")
            .and_then(Value::as_u64)
            .unwrap_or(5);

        log::debug!("reasoning: strategy={} problem_len={}", strategy, problem.len());

        let prompt = format!(
            "Reason about the following problem using a {} strategy (max {} iterations):\n\n{}",
            strategy, max_iterations, problem
        );
        let cancel_check = cancellation.clone();
        let trace = self.llm.generate(&prompt, cancellation).await.map_err(|e| {
            let err = collaborator_error(e, &cancel_check);
            log::warn!("reasoning executor failed: {}", err);
            err
        })?;

        Ok(json!({
            "problem": problem,
            "strategy": strategy,
            "max_iterations": max_iterations,
            "trace": trace,
        }))
    }
}
