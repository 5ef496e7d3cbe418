//! Error taxonomy shared across the crate
//!
//! Business-logic failures map to structured 4xx responses with a
//! machine-readable `message`/`field` pair; infrastructure failures map to
//! a generic 500.

use hyper::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PinboardError>;

#[derive(Debug, Error)]
pub enum PinboardError {
    /// Malformed ids, bodies, or business-rule violations caught up front
    #[error("{message}")]
    Validation { field: Option<String>, message: String },

    /// Missing or invalid credentials
    #[error("{0}")]
    Auth(String),

    /// Acting on another user's resource
    #[error("{0}")]
    Forbidden(String),

    /// Target entity absent
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// Duplicate unique edge under a race; retry-safe, not fatal
    #[error("{0}")]
    Conflict(String),

    /// Document store failure
    #[error("Database error: {0}")]
    Database(String),

    /// Transport-level failure (body read, bad upgrade)
    #[error("{0}")]
    Http(String),
}

/// JSON body returned for every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl PinboardError {
    /// Convenience constructor for field-scoped validation failures
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured body for the HTTP response
    pub fn body(&self) -> ErrorBody {
        let field = match self {
            Self::Validation { field, .. } => field.clone(),
            _ => None,
        };
        // Internal detail stays in the logs, not on the wire
        let message = match self {
            Self::Database(_) | Self::Http(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        ErrorBody { message, field }
    }
}

impl From<mongodb::error::Error> for PinboardError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            PinboardError::validation("id", "Invalid id").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PinboardError::Auth("no token".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            PinboardError::Forbidden("not yours".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(PinboardError::not_found("Pin").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            PinboardError::Conflict("duplicate".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PinboardError::Database("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let body = PinboardError::Database("connection string with secrets".into()).body();
        assert_eq!(body.message, "Internal Server Error");
    }

    #[test]
    fn validation_carries_field() {
        let body = PinboardError::validation("id", "Invalid id format").body();
        assert_eq!(body.field.as_deref(), Some("id"));
        assert_eq!(body.message, "Invalid id format");
    }
}
