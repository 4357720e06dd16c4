//! Engine configuration.
//!
//! Provides the [`EngineConfig`] struct for configuring chain timeouts and
//! where persisted shadow records live. Users construct this manually — no
//! file parsing dependencies are required.
//!
//! # Example
//!
//! ```rust
//! use agentchain::EngineConfig;
//! use std::path::PathBuf;
//!
//! let config = EngineConfig::default()
//!     .with_default_chain_timeout_seconds(120)
//!     .with_persistence_dir(PathBuf::from("/var/data/agent_chains"));
//! ```

use std::path::PathBuf;

/// Global configuration for the orchestration core.
///
/// This struct is intentionally minimal. No TOML, YAML, or other
/// config-file parsing dependencies are introduced.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timeout applied to a chain whose own `timeout_seconds` is `0`.
    pub default_chain_timeout_seconds: u64,
    /// Fixed cap on the per-agent cancellation token, independent of the
    /// chain-level deadline.
    pub max_agent_timeout_seconds: u64,
    /// Directory where shadow records, step records, and archival
    /// documents are written as append-only `.jsonl` files.
    pub persistence_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_chain_timeout_seconds: 300,
            max_agent_timeout_seconds: 180,
            persistence_dir: PathBuf::from("agent_chains"),
        }
    }
}

impl EngineConfig {
    pub fn with_default_chain_timeout_seconds(mut self, seconds: u64) -> Self {
        self.default_chain_timeout_seconds = seconds;
        self
    }

    pub fn with_max_agent_timeout_seconds(mut self, seconds: u64) -> Self {
        self.max_agent_timeout_seconds = seconds;
        self
    }

    pub fn with_persistence_dir(mut self, dir: PathBuf) -> Self {
        self.persistence_dir = dir;
        self
    }

    /// The timeout to apply to a chain given its own declared value (`0`
    /// meaning "use the default").
    pub fn effective_chain_timeout_seconds(&self, declared: u64) -> u64 {
        if declared > 0 {
            declared
        } else {
            self.default_chain_timeout_seconds
        }
    }
}
