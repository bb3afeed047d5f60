//! Error types for the reconnect coordinator.

use std::path::PathBuf;

/// Failure reported by the external store for a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("{action} rejected: {reason}")]
    Rejected {
        action: &'static str,
        reason: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the coordinator's own operations.
///
/// View refetch failures never show up here; they are folded into
/// [`FetchOutcome::Failed`](crate::types::FetchOutcome::Failed).
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("cache key lookup failed: {0}")]
    CacheKeys(#[from] DispatchError),

    #[error("invalid cache keys: {0}")]
    InvalidCacheKeys(#[from] serde_json::Error),
}

/// Errors produced while loading [`CoordinatorConfig`](crate::config::CoordinatorConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
