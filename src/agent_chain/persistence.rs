//! File-based stand-in for the underlying relational store.
//!
//! The real store is out of scope; this crate only needs *something*
//! concrete behind the [`ChainPersistence`] trait to be runnable and
//! testable end to end. [`FileChainPersistence`] writes one append-only
//! `.jsonl` file per concern, the same disk-format philosophy as this
//! crate's durable agent-memory log, minus the hash-chaining (there is no
//! tamper-evidence requirement on chain archival records).

use crate::agent_chain::error::CoreError;
use crate::agent_chain::model::{AgentChain, AgentExecutionLog, ChainExecutionResult};
use async_trait::async_trait;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable side-channel consulted by the chain registry, execution
/// tracker, and archiver. All methods are best-effort: implementations
/// return `Err` on failure, but callers MUST log and swallow it rather
/// than let it affect an execution's reported status.
#[async_trait]
pub trait ChainPersistence: Send + Sync {
    async fn save_chain_shadow(&self, chain: &AgentChain) -> Result<(), CoreError>;
    async fn update_execution_record(&self, result: &ChainExecutionResult) -> Result<(), CoreError>;
    async fn append_step_record(&self, execution_id: &str, step: &AgentExecutionLog) -> Result<(), CoreError>;
}

pub struct FileChainPersistence {
    chains_path: PathBuf,
    executions_path: PathBuf,
    steps_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileChainPersistence {
    pub fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            chains_path: dir.join("chains.jsonl"),
            executions_path: dir.join("executions.jsonl"),
            steps_path: dir.join("steps.jsonl"),
            write_lock: Mutex::new(()),
        })
    }

    fn append_line(&self, path: &Path, value: &impl Serialize) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().unwrap();
        let line = serde_json::to_string(value).map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;
        writeln!(file, "{}", line).map_err(|e| CoreError::PersistenceFailure(e.to_string()))
    }
}

#[derive(Serialize)]
struct StepRecord<'a> {
    execution_id: &'a str,
    #[serde(flatten)]
    step: &'a AgentExecutionLog,
}

/// The admitted-chain shadow record written at creation time. Tags the
/// serialized [`AgentChain`] with the status it's admitted under — a
/// sibling field here rather than on `AgentChain` itself, since a chain
/// definition has no status of its own (only a run of it does).
#[derive(Serialize)]
struct ChainShadowRecord<'a> {
    #[serde(flatten)]
    chain: &'a AgentChain,
    status: &'static str,
}

#[async_trait]
impl ChainPersistence for FileChainPersistence {
    async fn save_chain_shadow(&self, chain: &AgentChain) -> Result<(), CoreError> {
        self.append_line(&self.chains_path, &ChainShadowRecord { chain, status: "running" })
    }

    async fn update_execution_record(&self, result: &ChainExecutionResult) -> Result<(), CoreError> {
        self.append_line(&self.executions_path, result)
    }

    async fn append_step_record(&self, execution_id: &str, step: &AgentExecutionLog) -> Result<(), CoreError> {
        self.append_line(&self.steps_path, &StepRecord { execution_id, step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_chain::model::{AgentChain, ExecutionMode};
    use std::fs;
    use uuid::Uuid;

    #[tokio::test]
    async fn appends_one_line_per_shadow_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChainPersistence::open(dir.path()).unwrap();
        let chain = AgentChain::new("test", ExecutionMode::Sequential, Uuid::new_v4()).with_id("c1");
        store.save_chain_shadow(&chain).await.unwrap();
        store.save_chain_shadow(&chain).await.unwrap();
        let contents = fs::read_to_string(dir.path().join("chains.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
