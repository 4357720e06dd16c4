//! Data model for agents, chains, and execution results.
//!
//! These types mirror the wire-level shapes the engine passes around
//! internally; conversion to/from transport formats (HTTP, bot commands)
//! is a responsibility of the surrounding layer, not of this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// The closed set of agent capabilities the registry can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Reasoning,
    Chat,
    WebSearch,
    NoteAnalyzer,
    TaskPlanner,
    CodeGenerator,
    Summarizer,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Reasoning => "reasoning",
            AgentKind::Chat => "chat",
            AgentKind::WebSearch => "web_search",
            AgentKind::NoteAnalyzer => "note_analyzer",
            AgentKind::TaskPlanner => "task_planner",
            AgentKind::CodeGenerator => "code_generator",
            AgentKind::Summarizer => "summarizer",
        }
    }
}

/// One of `exists`, `equals`, `contains`, etc. evaluated against the chain
/// data bag before an agent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub data_key: String,
    #[serde(default)]
    pub value: Value,
}

impl ChainCondition {
    pub fn new(condition_type: impl Into<String>, data_key: impl Into<String>, value: Value) -> Self {
        Self {
            condition_type: condition_type.into(),
            data_key: data_key.into(),
            value,
        }
    }
}

/// Bounded retry behavior for a single agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub backoff_seconds: u64,
    #[serde(default)]
    pub retry_on_errors: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff_seconds: 0,
            retry_on_errors: Vec::new(),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_seconds(mut self, backoff_seconds: u64) -> Self {
        self.backoff_seconds = backoff_seconds;
        self
    }

    pub fn with_retry_on_errors(mut self, retry_on_errors: Vec<String>) -> Self {
        self.retry_on_errors = retry_on_errors;
        self
    }

    /// Total attempts this policy allows, always at least one.
    pub fn attempts(&self) -> u32 {
        std::cmp::max(1, self.max_retries + 1)
    }
}

/// One node in an [`AgentChain`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: String,
    pub kind: AgentKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: HashMap<String, Value>,
    #[serde(default)]
    pub input_mapping: HashMap<String, String>,
    #[serde(default)]
    pub output_key: String,
    #[serde(default)]
    pub conditions: Vec<ChainCondition>,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

impl AgentDefinition {
    pub fn new(id: impl Into<String>, kind: AgentKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            description: String::new(),
            config: HashMap::new(),
            input_mapping: HashMap::new(),
            output_key: String::new(),
            conditions: Vec::new(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn with_input_mapping(mut self, agent_key: impl Into<String>, chain_key: impl Into<String>) -> Self {
        self.input_mapping.insert(agent_key.into(), chain_key.into());
        self
    }

    pub fn with_output_key(mut self, output_key: impl Into<String>) -> Self {
        self.output_key = output_key.into();
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<ChainCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}

/// The three supported scheduling shapes for an [`AgentChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    Parallel,
    Conditional,
}

/// A named, ordered collection of agents plus a scheduling mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentChain {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mode: ExecutionMode,
    pub agents: Vec<AgentDefinition>,
    #[serde(default)]
    pub timeout_seconds: u64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentChain {
    pub fn new(name: impl Into<String>, mode: ExecutionMode, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            mode,
            agents: Vec::new(),
            timeout_seconds: 0,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_agents(mut self, agents: Vec<AgentDefinition>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_agent(mut self, agent: AgentDefinition) -> Self {
        self.agents.push(agent);
        self
    }
}

/// Initial request to run a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainExecutionRequest {
    pub chain_id: String,
    #[serde(default)]
    pub initial_data: HashMap<String, Value>,
    pub owner_id: Uuid,
}

/// Per-run mutable key/value store. A shallow copy seeds every execution;
/// only the engine writes to it.
pub type ChainDataBag = HashMap<String, Value>;

/// Outcome of a single agent invocation, recorded once per run regardless
/// of how many retry attempts it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecutionLog {
    pub agent_id: String,
    pub agent_name: String,
    pub status: StepStatus,
    pub input: Value,
    /// The agent's return value on success, or `None` on failure (the
    /// failure message lives in `error_message`).
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AgentExecutionLog {
    pub fn duration_seconds(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Failed,
}

/// A failure recorded against the chain as a whole (as opposed to a
/// per-step log entry, which every agent gets regardless of outcome).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecutionError {
    pub agent_id: String,
    pub agent_name: String,
    pub error_message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Timeout,
}

/// The full record of one chain run, mutated only by the execution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainExecutionResult {
    pub id: String,
    pub chain_id: String,
    pub status: ExecutionStatus,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results: ChainDataBag,
    #[serde(default)]
    pub errors: Vec<AgentExecutionError>,
    #[serde(default)]
    pub execution_log: Vec<AgentExecutionLog>,
    pub owner_id: Uuid,
}

impl ChainExecutionResult {
    pub fn new(chain_id: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chain_id: chain_id.into(),
            status: ExecutionStatus::Running,
            start: Utc::now(),
            end: None,
            results: ChainDataBag::new(),
            errors: Vec::new(),
            execution_log: Vec::new(),
            owner_id,
        }
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.end
            .map(|end| (end - self.start).num_milliseconds() as f64 / 1000.0)
    }
}
