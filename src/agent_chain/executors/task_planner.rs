//! `task_planner` agent: turns a goal into a plan, optionally materializing
//! tasks via the document-authoring collaborator.

use crate::agent_chain::collaborators::{DocumentAuthoring, LlmGenerator};
use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{
    collaborator_error, optional_bool, require_str, AgentExecutor, ExecutorInput,
};
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub struct TaskPlannerExecutor {
    llm: Arc<dyn LlmGenerator>,
    authoring: Arc<dyn DocumentAuthoring>,
}

impl TaskPlannerExecutor {
    pub fn new(llm: Arc<dyn LlmGenerator>, authoring: Arc<dyn DocumentAuthoring>) -> Self {
        Self { llm, authoring }
    }
}

#[async_trait]
impl AgentExecutor for TaskPlannerExecutor {
    fn kind(&self) -> AgentKind {
        AgentKind::TaskPlanner
    }

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError> {
        let goal = require_str(input, "goal")?;
        let create_tasks = optional_bool(input, "create_tasks", false);
        let owner_id = input
            .get("user_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        let cancel_check = cancellation.clone();
        let prompt = format!("Break the following goal into concrete steps:\n\n{}", goal);
        let plan_text = self
            .llm
            .generate(&prompt, cancellation)
            .await
            .map_err(|e| collaborator_error(e, &cancel_check))?;

        let mut created_task_ids = Vec::new();
        if create_tasks {
            for (i, step) in plan_text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
                match self
                    .authoring
                    .create_note(owner_id, "", &format!("Task {}: {}", i + 1, step.trim()))
                    .await
                {
                    Ok(id) => created_task_ids.push(id),
                    Err(e) => log::warn!("task_planner: failed to materialize task: {}", e),
                }
            }
        }

        Ok(json!({
            "goal": goal,
            "plan": plan_text,
            "created_tasks": created_task_ids,
        }))
    }
}
