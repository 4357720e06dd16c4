//! Error taxonomy for the agent orchestration core.
//!
//! `CoreError` is a single flat enum covering every failure mode a chain
//! admission, execution, or archival step can surface. No `thiserror` or
//! `anyhow` dependency is introduced — `Display` and `std::error::Error`
//! are implemented by hand, the same way the rest of this crate's error
//! types are built.

use std::fmt;

/// Errors surfaced by the chain registry, execution engine, and archiver.
#[derive(Debug, Clone)]
pub enum CoreError {
    /// A chain failed admission validation (empty name, no agents, unknown
    /// agent kind).
    InvalidChain(String),
    /// `load_chain_definition` found neither a registered nor a built-in
    /// chain with the given id.
    ChainNotFound(String),
    /// An executor rejected its input bag (missing required key, wrong
    /// type).
    InvalidInput(String),
    /// The collaborator behind an executor returned an error.
    ExecutorFailure(String),
    /// A cancellation token fired while an agent or the chain was running.
    Cancelled,
    /// A condition referenced an unknown `type`. Evaluates to `false`;
    /// this variant exists so callers constructing conditions by hand can
    /// detect the mistake early.
    ConditionMalformed(String),
    /// A shadow record, step record, or archival document failed to
    /// persist. Logged by the caller, never surfaced to the chain's own
    /// status.
    PersistenceFailure(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidChain(msg) => write!(f, "invalid chain: {}", msg),
            CoreError::ChainNotFound(id) => write!(f, "chain not found: {}", id),
            CoreError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            CoreError::ExecutorFailure(msg) => write!(f, "executor failed: {}", msg),
            CoreError::Cancelled => write!(f, "cancelled"),
            CoreError::ConditionMalformed(kind) => write!(f, "malformed condition: {}", kind),
            CoreError::PersistenceFailure(msg) => write!(f, "persistence failure: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

impl CoreError {
    /// True when this error represents a cooperative cancellation rather
    /// than a genuine failure. The retry controller must never retry a
    /// cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}
