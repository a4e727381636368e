//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::{AccountId, AmountError, DomainError};

/// Result type of every ledger operation
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors returned by the ledger core
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Underlying store failure, including a failed commit
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Rolling back after `original` failed as well
    #[error("Rollback failed after: {original}")]
    RollbackFailed {
        original: Box<LedgerError>,
        #[source]
        rollback: sqlx::Error,
    },
}

impl LedgerError {
    pub fn account_not_found(id: AccountId) -> Self {
        Self::Domain(DomainError::AccountNotFound(id))
    }

    /// The business rule violation behind this error, if any.
    ///
    /// A failed rollback still reports the violation that caused it.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::RollbackFailed { original, .. } => original.domain(),
            Self::Storage(_) => None,
        }
    }

    /// Whether the store itself failed
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::RollbackFailed { .. })
    }
}

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        Self::Domain(err.into())
    }
}

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// HTTP-facing error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        Self::Ledger(err.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn domain_status(err: &DomainError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        DomainError::AccountNotFound(id) => {
            (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
        }
        DomainError::InvalidAmount(msg) => {
            (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
        }
        DomainError::InsufficientFunds { .. } => {
            (StatusCode::BAD_REQUEST, "insufficient_funds", Some(err.to_string()))
        }
        DomainError::SameAccountTransfer => {
            (StatusCode::BAD_REQUEST, "same_account_transfer", None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            AppError::Ledger(LedgerError::Domain(domain_err)) => domain_status(domain_err),

            AppError::Ledger(e @ LedgerError::Storage(_)) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Ledger(e @ LedgerError::RollbackFailed { .. }) => {
                tracing::error!("Rollback failed: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "rollback_failed", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
