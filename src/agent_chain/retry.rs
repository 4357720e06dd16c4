//! C4: wraps a single agent invocation with bounded retry and backoff.

use crate::agent_chain::error::CoreError;
use crate::agent_chain::executor::{AgentExecutor, ExecutorInput};
use crate::agent_chain::model::RetryPolicy;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Invoke `executor` under `policy`, sleeping between attempts and giving
/// up according to `retry_on_errors`. Never retries a cancellation.
/// Returns the final `Ok`/`Err` only — intermediate attempts are not
/// surfaced, matching the "one log entry per final outcome" rule.
pub async fn run_with_retry(
    executor: &dyn AgentExecutor,
    policy: &RetryPolicy,
    cancellation: CancellationToken,
    input: &ExecutorInput,
) -> Result<Value, CoreError> {
    let attempts = policy.attempts();
    let mut last_error = CoreError::ExecutorFailure(String::new());

    for attempt in 1..=attempts {
        if cancellation.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let attempt_result = tokio::select! {
            res = executor.execute(cancellation.clone(), input) => res,
            _ = cancellation.cancelled() => Err(CoreError::Cancelled),
        };

        match attempt_result {
            Ok(value) => return Ok(value),
            Err(err) => {
                if err.is_cancelled() {
                    return Err(err);
                }
                last_error = err;
                if attempt == attempts || !should_retry(&last_error, policy) {
                    return Err(last_error);
                }
                let backoff = std::cmp::max(policy.backoff_seconds, attempt as u64);
                log::warn!(
                    "retrying after failure (attempt {}/{}, backing off {}s): {}",
                    attempt,
                    attempts,
                    backoff,
                    last_error
                );
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_secs(backoff)) => {}
                    _ = cancellation.cancelled() => return Err(CoreError::Cancelled),
                }
            }
        }
    }

    Err(last_error)
}

fn should_retry(error: &CoreError, policy: &RetryPolicy) -> bool {
    if policy.retry_on_errors.is_empty() {
        return true;
    }
    let message = error.to_string();
    policy
        .retry_on_errors
        .iter()
        .any(|needle| message.contains(needle.as_str()))
}
