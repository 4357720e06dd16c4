//! The uniform contract every agent kind implements.

use crate::agent_chain::error::CoreError;
use crate::agent_chain::model::AgentKind;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

/// Input bag handed to an executor: the agent's static `config` merged
/// with whatever `input_mapping` pulled from the chain data bag, plus
/// `user_id` when the chain has an owner.
pub type ExecutorInput = Map<String, Value>;

/// A single agent kind's behavior. Implementations MUST be safe to call
/// concurrently with distinct inputs (parallel mode invokes every agent's
/// executor at once) and MUST return promptly once `cancellation` fires.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn execute(
        &self,
        cancellation: CancellationToken,
        input: &ExecutorInput,
    ) -> Result<Value, CoreError>;
}

/// Fetch a required string input, or a descriptive error.
pub fn require_str<'a>(input: &'a ExecutorInput, key: &str) -> Result<&'a str, CoreError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::InvalidInput(format!("missing required input '{}'", key)))
}

/// Convert a collaborator boundary's `String` error into the typed
/// taxonomy. Checks the token's actual state rather than trusting a
/// magic string a collaborator implementation happens to return, so a
/// double or provider is free to word its cancellation error however it
/// likes.
pub fn collaborator_error(message: String, cancellation: &CancellationToken) -> CoreError {
    if cancellation.is_cancelled() {
        CoreError::Cancelled
    } else {
        CoreError::ExecutorFailure(message)
    }
}

/// Fetch an optional string input with a default.
pub fn optional_str<'a>(input: &'a ExecutorInput, key: &str, default: &'a str) -> &'a str {
    input.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Fetch an optional integer input with a default.
pub fn optional_u64(input: &ExecutorInput, key: &str, default: u64) -> u64 {
    input.get(key).and_then(Value::as_u64).unwrap_or(default)
}

/// Fetch an optional boolean input with a default.
pub fn optional_bool(input: &ExecutorInput, key: &str, default: bool) -> bool {
    input.get(key).and_then(Value::as_bool).unwrap_or(default)
}
