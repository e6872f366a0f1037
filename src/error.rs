//! Error taxonomy shared by the store, the auth service and the HTTP layer.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failures of the document store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage media could not be read or written.
    #[error("I/O failure on resource `{resource}`: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored bytes do not decode into the expected document.
    #[error("resource `{resource}` is corrupt: {source}")]
    Corrupt {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// The mutation task panicked or was aborted; nothing was persisted.
    #[error("mutation of resource `{resource}` was interrupted: {reason}")]
    Interrupted { resource: String, reason: String },
}

impl StorageError {
    pub fn io(resource: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { resource: resource.into(), source }
    }

    pub fn corrupt(resource: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Corrupt { resource: resource.into(), source }
    }

    pub fn interrupted(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Interrupted { resource: resource.into(), reason: reason.into() }
    }
}

/// Credential and bearer-token failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    /// Token or stored hash is not in a decodable shape.
    #[error("Malformed credential: {0}")]
    Malformed(String),
}

impl AuthError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

/// Error returned by every core operation and rendered by the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(kind: &str, key: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} not found: {}", kind, key))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Storage(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "request failed with server error");
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": message,
        }))
    }
}
