//! C7: live execution visibility plus best-effort durable archival of
//! final results. Persistence here is purely an observer — a failed write
//! never changes what the caller already holds as the execution's status.

use crate::agent_chain::model::{AgentExecutionLog, ChainExecutionResult};
use crate::agent_chain::persistence::ChainPersistence;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct ExecutionTracker {
    persistence: Arc<dyn ChainPersistence>,
    active: Mutex<HashMap<String, ChainExecutionResult>>,
}

impl ExecutionTracker {
    pub fn new(persistence: Arc<dyn ChainPersistence>) -> Self {
        Self {
            persistence,
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, result: ChainExecutionResult) {
        self.active.lock().unwrap().insert(result.id.clone(), result);
    }

    pub fn update(&self, result: ChainExecutionResult) {
        self.active.lock().unwrap().insert(result.id.clone(), result);
    }

    pub fn unregister(&self, execution_id: &str) {
        self.active.lock().unwrap().remove(execution_id);
    }

    pub fn active_executions(&self) -> Vec<ChainExecutionResult> {
        self.active.lock().unwrap().values().cloned().collect()
    }

    pub fn execution_status(&self, execution_id: &str) -> Option<ChainExecutionResult> {
        self.active.lock().unwrap().get(execution_id).cloned()
    }

    /// Best-effort: logs and swallows any persistence failure.
    pub async fn append_step_record(&self, execution_id: &str, step: &AgentExecutionLog) {
        if let Err(e) = self.persistence.append_step_record(execution_id, step).await {
            log::warn!("failed to persist step record for execution {}: {}", execution_id, e);
        }
    }

    /// Best-effort final write. Called once per execution, after the
    /// engine has already decided the terminal status.
    pub async fn save_execution_result(&self, result: &ChainExecutionResult) {
        if let Err(e) = self.persistence.update_execution_record(result).await {
            log::warn!("failed to persist execution record for {}: {}", result.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_chain::persistence::FileChainPersistence;
    use uuid::Uuid;

    #[tokio::test]
    async fn register_then_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let persistence: Arc<dyn ChainPersistence> =
            Arc::new(FileChainPersistence::open(dir.path()).unwrap());
        let tracker = ExecutionTracker::new(persistence);
        let result = ChainExecutionResult::new("c1", Uuid::new_v4());
        let id = result.id.clone();
        tracker.register(result);
        assert!(tracker.execution_status(&id).is_some());
        tracker.unregister(&id);
        assert!(tracker.execution_status(&id).is_none());
    }
}
