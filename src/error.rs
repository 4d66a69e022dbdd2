//! Failure taxonomy at the engine boundary.
//!
//! `ApiError` is what the transport reports; `EngineError` is what callers of
//! the engine see after classification. Nothing here is fatal: each kind
//! degrades one feature of the session.

use crate::types::ActionFamily;
use thiserror::Error;

/// Transport-level outcome of a remote call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("not authenticated (401)")]
    Unauthorized,
    /// 429 from a data endpoint; `demo` when the body still carried demo data
    #[error("upstream quota exceeded (429)")]
    QuotaExceeded { demo: bool },
    #[error("http {code}: {message}")]
    Status { code: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Classified failure surfaced by engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Session expired or never existed; handled as a logout, not a banner
    #[error("not authenticated")]
    Unauthenticated,
    #[error("upstream quota exceeded")]
    QuotaExceeded,
    #[error("{message}")]
    Validation { message: String },
    #[error("Failed to {action} comment. Please try again.")]
    MutationFailure { action: &'static str },
    #[error("{category} fetch failed: {message}")]
    TransientFetch { category: &'static str, message: String },
    /// Another request of the same family is still pending for this comment
    #[error("a {family} request for comment {comment_id} is already in flight")]
    Busy {
        comment_id: String,
        family: ActionFamily,
    },
    #[error("unknown comment {0}")]
    UnknownComment(String),
}

impl EngineError {
    /// Map a failed mutation call; 401 keeps its own meaning
    pub fn from_mutation(err: &ApiError, action: &'static str) -> Self {
        match err {
            ApiError::Unauthorized => EngineError::Unauthenticated,
            _ => EngineError::MutationFailure { action },
        }
    }

    /// Map a failed data fetch for `category`
    pub fn from_fetch(err: &ApiError, category: &'static str) -> Self {
        match err {
            ApiError::Unauthorized => EngineError::Unauthenticated,
            ApiError::QuotaExceeded { .. } => EngineError::QuotaExceeded,
            other => EngineError::TransientFetch {
                category,
                message: other.to_string(),
            },
        }
    }

    /// Whether this should reach the user as an error notice
    pub fn is_user_visible_error(&self) -> bool {
        matches!(
            self,
            EngineError::MutationFailure { .. } | EngineError::TransientFetch { .. }
        )
    }
}
