use thiserror::Error;

use crate::domain::ActivityId;

#[derive(Error, Debug)]
pub enum EbbError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exceeded on {endpoint}")]
    RateLimited { endpoint: String },

    #[error("Item {id} is inaccessible: {reason}")]
    Inaccessible { id: ActivityId, reason: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EbbError {
    /// The remote per-window call budget is exhausted. Fatal to the current run.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The target no longer exists, or the account cannot see it.
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, Self::Inaccessible { .. })
    }
}

pub type Result<T> = std::result::Result<T, EbbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let limited = EbbError::RateLimited {
            endpoint: "favorites/create".into(),
        };
        assert!(limited.is_rate_limit());
        assert!(!limited.is_inaccessible());

        let gone = EbbError::Inaccessible {
            id: 42,
            reason: "No status found with that ID.".into(),
        };
        assert!(gone.is_inaccessible());
        assert!(!gone.is_rate_limit());

        let other = EbbError::Api {
            status: 500,
            message: "Internal error".into(),
        };
        assert!(!other.is_rate_limit());
        assert!(!other.is_inaccessible());
    }

    #[test]
    fn test_display() {
        let err = EbbError::Inaccessible {
            id: 7,
            reason: "blocked".into(),
        };
        assert_eq!(err.to_string(), "Item 7 is inaccessible: blocked");
    }
}
