//! # Server Error Types
//!
//! All errors that can occur in the lifecycle and replication engine.
//!
//! Two severities exist. Fatal errors are programming-invariant violations
//! (a bad configstring index, a bad client index, a re-entrant low-level
//! startup); the embedding process terminates or drops to its menu on these.
//! Everything else is recoverable: log a line and keep serving.

use thiserror::Error;

/// Errors that can occur in the server engine.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configstring index outside `[0, MAX_CONFIGSTRINGS)`.
    #[error("bad configstring index {index}")]
    InvalidConfigString {
        /// The offending index.
        index: usize,
    },

    /// Client slot index outside the live slot table.
    #[error("bad client index {index}")]
    InvalidClient {
        /// The offending index.
        index: usize,
    },

    /// Low-level startup was called while the server static state was
    /// already initialized.
    #[error("server already initialized")]
    AlreadyInitialized,

    /// The asset layer could not load the named map.
    #[error("failed to load map {map:?}: {reason}")]
    MapLoad {
        /// Map that failed to load.
        map: String,
        /// Reason reported by the asset layer.
        reason: String,
    },

    /// Startup settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file could not be read.
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed.
    #[error("settings parse: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ServerError {
    /// Returns true for programming-invariant violations that must abort
    /// the current operation and terminate the embedding process.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfigString { .. } | Self::InvalidClient { .. } | Self::AlreadyInitialized
        )
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ServerError::InvalidConfigString { index: 9999 }.is_fatal());
        assert!(ServerError::InvalidClient { index: 99 }.is_fatal());
        assert!(ServerError::AlreadyInitialized.is_fatal());
        assert!(!ServerError::MapLoad { map: "arena1".into(), reason: "missing".into() }.is_fatal());
        assert!(!ServerError::InvalidSettings("max_clients".into()).is_fatal());
    }
}
