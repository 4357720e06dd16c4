//! `code_generator` agent: generates code from a specification and strips
//! any triple-backtick fence (and leading language tag) the model wraps
//! its answer in.

use crate::agent_chain::collaborators::LlmGenerator;
use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{collaborator_error, optional_str, require_str, AgentExecutor, ExecutorInput};
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct CodeGeneratorExecutor {
    llm: Arc<dyn LlmGenerator>,
}

impl CodeGeneratorExecutor {
    pub fn new(llm: Arc<dyn LlmGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for CodeGeneratorExecutor {
    fn kind(&self) -> AgentKind {
        AgentKind::CodeGenerator
    }

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError> {
        let specification = require_str(input, "specification")?;
        let language = optional_str(input, "language", "go");
        let style = input.get("style").and_then(Value::as_str).unwrap_or("");

        let prompt = if style.is_empty() {
            format!("Write {} code for:\n\n{}", language, specification)
        } else {
            format!(
                "Write {} code in a {} style for:\n\n{}",
                language, style, specification
            )
        };

        let cancel_check = cancellation.clone();
        let raw = self
            .llm
            .generate(&prompt, cancellation)
            .await
            .map_err(|e| collaborator_error(e, &cancel_check))?;
        let code = strip_code_fence(&raw);

        Ok(json!({
            "code": code,
            "language": language,
            "specification": specification,
        }))
    }
}

/// Strips a leading/trailing ``` fence and an optional language tag on the
/// opening fence line (e.g. ` ```rust\nfn main() {}\n``` ` → `fn main() {}`).
/// Text without fences is returned trimmed, unchanged otherwise.
fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let without_open = &trimmed[3..];
    let after_tag = match without_open.find('\n') {
        Some(idx) => &without_open[idx + 1..],
        None => without_open,
    };
    let body = after_tag.strip_suffix("```").unwrap_or(after_tag);
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_chain::collaborators::doubles::ScriptedLlm;
    use serde_json::Map;

    #[tokio::test]
    async fn requires_specification() {
        let exec = CodeGeneratorExecutor::new(Arc::new(ScriptedLlm::fixed("code")));
        assert!(exec.execute(CancellationToken::new(), &Map::new()).await.is_err());
    }

    #[tokio::test]
    async fn strips_fenced_code_with_language_tag() {
        let exec = CodeGeneratorExecutor::new(Arc::new(ScriptedLlm::fixed(
            "```go\nfunc main() {}\n```",
        )));
        let mut input = Map::new();
        input.insert("specification".into(), json!("a no-op main"));
        let out = exec.execute(CancellationToken::new(), &input).await.unwrap();
        assert_eq!(out["code"], "func main() {}");
    }

    #[tokio::test]
    async fn passes_through_unfenced_code() {
        let exec = CodeGeneratorExecutor::new(Arc::new(ScriptedLlm::fixed("func main() {}")));
        let mut input = Map::new();
        input.insert("specification".into(), json!("a no-op main"));
        let out = exec.execute(CancellationToken::new(), &input).await.unwrap();
        assert_eq!(out["code"], "func main() {}");
    }

    #[test]
    fn strip_code_fence_handles_bare_fence_without_language() {
        assert_eq!(strip_code_fence("```\nhello\n```"), "hello");
    }
}
