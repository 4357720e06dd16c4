// src/lib.rs

// Import the top-level `agent_chain` module.
pub mod agent_chain;

// Re-exporting key items for easier external access.
pub use agent_chain::chain_registry::ChainRegistry;
pub use agent_chain::config::EngineConfig;
pub use agent_chain::engine::ExecutionEngine;
pub use agent_chain::error::CoreError;
pub use agent_chain::model::{
    AgentChain, AgentDefinition, AgentExecutionError, AgentExecutionLog, AgentKind,
    ChainCondition, ChainDataBag, ChainExecutionRequest, ChainExecutionResult, ExecutionMode,
    ExecutionStatus, RetryPolicy,
};
pub use agent_chain::registry::AgentRegistry;
pub use agent_chain::tracker::ExecutionTracker;
