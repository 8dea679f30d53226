//! Error types for the ghost replay core

/// Errors reported by recording, codec, storage and configuration operations.
///
/// Every failure is a deterministic function of its input, so nothing here is
/// worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Operation invoked in a state that forbids it
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Serialized recording could not be parsed
    #[error("malformed recording data: {0}")]
    MalformedData(String),

    /// Run name rejected by the store
    #[error("invalid run name '{0}' (allowed: A-Z, a-z, 0-9, '-', '_')")]
    InvalidName(String),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// Filesystem failure in the store or config layer
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReplayError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedData(msg.into())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ReplayError>;
