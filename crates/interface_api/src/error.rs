//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::{CoreError, PortError, TemporalError};
use domain_ledger::LedgerError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },
}

impl ApiError {
    /// A validation error without per-item details
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => {
                error!(message = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg, None),
            ApiError::Validation { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                (!details.is_empty()).then_some(details),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(errors) => ApiError::Validation {
                message: format!("Journal entry rejected: {}", errors.first()),
                details: errors
                    .iter()
                    .map(|e| format!("{}: {}", e.rule(), e))
                    .collect(),
            },
            LedgerError::InvalidAccount { .. } => ApiError::validation(err.to_string()),
            LedgerError::InvalidPeriod(e) => e.into(),
            LedgerError::AccountNotFound(_) | LedgerError::EntryNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            LedgerError::DuplicateAccountCode(_)
            | LedgerError::AccountInUse { .. }
            | LedgerError::AccountHasChildren { .. }
            | LedgerError::EntryLocked { .. }
            | LedgerError::StatusChanged { .. }
            | LedgerError::InvalidStatusTransition { .. } => ApiError::Conflict(err.to_string()),
            LedgerError::Persistence(e) => e.into(),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        if err.is_transient() {
            ApiError::Unavailable(err.to_string())
        } else if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else if err.is_conflict() {
            ApiError::Conflict(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<TemporalError> for ApiError {
    fn from(err: TemporalError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_input_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();

        ApiError::Validation {
            message: "Request validation failed".to_string(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_ledger::{ValidationError, ValidationErrors};

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_ledger_error_status_mapping() {
        let rejected = ValidationErrors::from(ValidationError::NoLines);
        assert_eq!(status_of(LedgerError::Validation(rejected)), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_of(LedgerError::AccountNotFound("9999".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LedgerError::DuplicateAccountCode("1011".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LedgerError::Persistence(PortError::connection("down"))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(LedgerError::Persistence(PortError::internal("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_malformed_identifier_is_bad_request() {
        let err = "JNL-xyz".parse::<core_kernel::EntryId>().unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CoreError::from(core_kernel::MoneyError::Overflow)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_details_carry_rule_names() {
        let rejected = ValidationErrors::from(ValidationError::MissingEntryNumber);
        match ApiError::from(LedgerError::Validation(rejected)) {
            ApiError::Validation { details, .. } => {
                assert_eq!(details.len(), 1);
                assert!(details[0].starts_with("missing_entry_number"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
