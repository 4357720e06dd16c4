//! C8: materializes a completed execution as a document tree via the
//! document-authoring collaborator. Best-effort and invoked at most once
//! per execution by the engine; it never feeds back into execution status.

use crate::agent_chain::collaborators::DocumentAuthoring;
use crate::agent_chain::model::{AgentChain, AgentExecutionLog, ChainExecutionResult, StepStatus};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Keys rendered first in the final-results document, in this order.
/// Anything else follows afterwards in arbitrary (map iteration) order.
const PREFERRED_KEY_ORDER: &[&str] = &["search_results", "analysis", "summary", "search_query", "user_id"];

fn emoji_for(key: &str) -> Option<&'static str> {
    match key {
        "search_results" => Some("🔍"),
        "analysis" => Some("🧠"),
        "summary" => Some("📝"),
        "search_query" => Some("❓"),
        _ => None,
    }
}

pub struct ResultArchiver {
    authoring: Arc<dyn DocumentAuthoring>,
}

impl ResultArchiver {
    pub fn new(authoring: Arc<dyn DocumentAuthoring>) -> Self {
        Self { authoring }
    }

    pub async fn archive(
        &self,
        owner_id: Uuid,
        chain: &AgentChain,
        result: &ChainExecutionResult,
    ) -> Result<(), String> {
        let title = format!("Agent Chain: {} - {}", chain.name, result.start.to_rfc3339());
        let container_id = self.authoring.create_notebook(owner_id, &title, "").await?;

        self.write_overview(owner_id, &container_id, chain, result).await?;

        for (order, step) in result.execution_log.iter().enumerate() {
            self.write_step(owner_id, &container_id, step, order as u32 + 1).await?;
        }

        self.write_final_results(owner_id, &container_id, result, result.execution_log.len() as u32 + 1)
            .await?;

        Ok(())
    }

    async fn write_overview(
        &self,
        owner_id: Uuid,
        container_id: &str,
        chain: &AgentChain,
        result: &ChainExecutionResult,
    ) -> Result<(), String> {
        let note_id = self.authoring.create_note(owner_id, container_id, "Overview").await?;
        let duration = result.duration_seconds().map(|d| format!("{:.1}s", d)).unwrap_or_else(|| "n/a".to_string());

        let mut body = format!(
            "# Overview\n\n**Chain:** {}\n**Mode:** {:?}\n**Status:** {:?}\n**Duration:** {}\n**Execution ID:** {}\n",
            chain.name, chain.mode, result.status, duration, result.id
        );
        if !result.errors.is_empty() {
            body.push_str("\n## Errors\n");
            for err in &result.errors {
                body.push_str(&format!("- **{}**: {}\n", err.agent_name, err.error_message));
            }
        }

        self.authoring
            .create_block(owner_id, &note_id, "markdown", 0, &body, Value::Null)
            .await?;
        Ok(())
    }

    async fn write_step(
        &self,
        owner_id: Uuid,
        container_id: &str,
        step: &AgentExecutionLog,
        order: u32,
    ) -> Result<(), String> {
        let note_id = self.authoring.create_note(owner_id, container_id, &step.agent_name).await?;

        let status_label = match step.status {
            StepStatus::Completed => "Completed",
            StepStatus::Failed => "Failed",
        };
        let mut body = format!(
            "# {}\n\n**Status:** {}\n**Duration:** {:.1}s\n**Agent ID:** {}\n\n## Input Parameters\n\n```json\n{}\n```\n\n## Output\n\n",
            step.agent_name,
            status_label,
            step.duration_seconds(),
            step.agent_id,
            serde_json::to_string_pretty(&step.input).unwrap_or_default(),
        );

        match step.status {
            StepStatus::Failed => {
                let message = step.error_message.clone().unwrap_or_default();
                body.push_str(&format!("**Error:** {}\n", message));
            }
            StepStatus::Completed => match &step.output {
                Some(Value::Object(_)) => {
                    body.push_str(&format!(
                        "```json\n{}\n```\n",
                        serde_json::to_string_pretty(&step.output).unwrap_or_default()
                    ));
                }
                Some(other) => body.push_str(&format!("{}\n", value_to_display_string(other))),
                None => {}
            },
        }

        self.authoring
            .create_block(owner_id, &note_id, "markdown", order, &body, Value::Null)
            .await?;
        Ok(())
    }

    async fn write_final_results(
        &self,
        owner_id: Uuid,
        container_id: &str,
        result: &ChainExecutionResult,
        order: u32,
    ) -> Result<(), String> {
        let note_id = self.authoring.create_note(owner_id, container_id, "Final Results").await?;

        let mut body = String::from("# Final Results\n\n");
        let mut rendered = std::collections::HashSet::new();

        for key in PREFERRED_KEY_ORDER {
            if let Some(value) = result.results.get(*key) {
                if *key == "user_id" {
                    rendered.insert(key.to_string());
                    continue;
                }
                render_block(&mut body, key, value, 0);
                rendered.insert(key.to_string());
            }
        }
        for (key, value) in &result.results {
            if rendered.contains(key) || key == "user_id" {
                continue;
            }
            render_block(&mut body, key, value, 0);
        }

        self.authoring
            .create_block(owner_id, &note_id, "markdown", order, &body, Value::Null)
            .await?;
        Ok(())
    }
}

fn humanize_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    spaced
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_block(body: &mut String, key: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    let title = match emoji_for(key) {
        Some(emoji) => format!("{} {}", emoji, humanize_key(key)),
        None => humanize_key(key),
    };

    match value {
        Value::String(s) => {
            body.push_str(&format!("{}**{}**\n\n{}{}\n\n", indent, title, indent, s));
        }
        Value::Object(map) => {
            body.push_str(&format!("{}**{}**\n\n", indent, title));
            for (k, v) in map {
                render_block(body, k, v, depth + 1);
            }
        }
        Value::Array(items) => {
            body.push_str(&format!("{}**{}**\n\n", indent, title));
            for item in items {
                let line = match item {
                    Value::Object(map) => map
                        .get("title")
                        .or_else(|| map.get("name"))
                        .map(value_to_display_string)
                        .unwrap_or_else(|| value_to_display_string(item)),
                    other => value_to_display_string(other),
                };
                body.push_str(&format!("{}- {}\n", indent, line));
            }
            body.push('\n');
        }
        other => {
            body.push_str(&format!("{}**{}**\n\n{}{}\n\n", indent, title, indent, value_to_display_string(other)));
        }
    }
}

fn value_to_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
