/**
 * Backend Error Types
 *
 * The error taxonomy every handler reports through:
 *
 * - `Validation` - missing or malformed fields (400)
 * - `NotFound` - entity or parent missing (404)
 * - `Forbidden` - caller may not touch this entity (403)
 * - `Unauthenticated` - missing or invalid credential (401)
 * - `Store` / `Internal` - anything unexpected (500, detail only logged)
 */

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::realtime::RealtimeError;
use crate::backend::store::StoreError;
use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        /// Offending request field
        field: String,
        /// Human-readable error message
        message: String,
    },

    #[error("{entity} not found")]
    NotFound {
        /// Kind of entity, e.g. "Card"
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Body text for every 500 response
pub const INTERNAL_MESSAGE: &str = "Internal server error";

impl BackendError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Store(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller; server faults never leak detail
    pub fn message(&self) -> String {
        match self {
            Self::Store(_) | Self::Internal { .. } => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        let SharedError::ValidationError { field, message } = err;
        Self::Validation { field, message }
    }
}

impl From<RealtimeError> for BackendError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::UnknownConnection(id) => Self::NotFound {
                entity: "Connection",
                id: id.to_string(),
            },
            RealtimeError::NotOwner(_) => Self::forbidden(err.to_string()),
            RealtimeError::PresenceEvent(_) => Self::validation("kind", err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            BackendError::validation("name", "name is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::not_found("Card", Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(BackendError::forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            BackendError::unauthenticated("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_hidden() {
        let error = BackendError::internal("connection reset by peer");
        assert_eq!(error.message(), INTERNAL_MESSAGE);
        let error = BackendError::Store(StoreError::Unavailable("pool closed".to_string()));
        assert_eq!(error.message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn test_from_shared_error() {
        let backend_error: BackendError = SharedError::validation("title", "title is required").into();
        match backend_error {
            BackendError::Validation { field, .. } => assert_eq!(field, "title"),
            _ => panic!("Expected Validation variant"),
        }
    }

    #[test]
    fn test_not_found_message() {
        let error = BackendError::not_found("List", Uuid::nil());
        assert_eq!(error.message(), "List not found");
    }
}
