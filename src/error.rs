//! Error taxonomy for the core library.
//!
//! Provider and parse failures carry the remote service's message so callers
//! can record it (e.g. on a session row). "No match found" during resolution
//! is never an error; only missing required records are.

/// Convenience alias used throughout the core modules.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The embedding or generation service was unreachable or returned an error.
    #[error("provider error: {0}")]
    Provider(String),

    /// A remote model produced output that could not be parsed, even after
    /// the fallback recovery path.
    #[error("parse error: {0}")]
    Parse(String),

    /// A referenced campaign, session, or persona does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// `true` for failures of the remote embedding/generation service.
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}
