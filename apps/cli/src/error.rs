//! # CLI Error Types
//!
//! Errors in the shape the user sees: a stable code plus a message.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  pharma-core          pharma-client            pharma-cli               │
//! │  ───────────          ─────────────            ──────────               │
//! │  CoreError ──────────► ClientError ───────────► CliError                │
//! │  (rules, Rx gate)      (backend, transport)     { code, message }       │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                      stderr: {"code": "...", ...}       │
//! │                                      exit status 1                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Messages
//! Backend refusals carry the backend's own text. When the backend gave no
//! text, the command's fallback (e.g. "Failed to place order.") is used.

use pharma_client::ClientError;
use pharma_core::{CoreError, StorageError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Used when a failure has no better description.
pub const GENERIC_FALLBACK: &str = "Something went wrong. Please try again.";

/// Error codes for programmatic handling by scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Sign in first
    AuthRequired,
    /// Rx items without a prescription
    PrescriptionRequired,
    EmptyCart,
    InvalidPromoCode,
    /// Input validation failed
    ValidationError,
    /// The order cannot take a payment
    PaymentNotApplicable,
    /// The requested status change is not allowed
    InvalidTransition,
    NotFound,
    /// The backend refused the request
    BackendRejected,
    NetworkError,
    Cancelled,
    /// The same action is already running
    InFlight,
    ConfigError,
    StorageError,
    Internal,
}

/// Error returned by every command.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Converts a client error, using `fallback` when the backend refused
    /// without saying why.
    pub fn from_client(err: ClientError, fallback: &str) -> Self {
        let message = err.user_message(fallback);
        let code = match &err {
            ClientError::Core(core) => return CliError::from_core(core),
            ClientError::TransitionRejected { .. } => ErrorCode::InvalidTransition,
            ClientError::Rejected { status: 401, .. } => ErrorCode::AuthRequired,
            ClientError::Rejected { status: 404, .. } => ErrorCode::NotFound,
            ClientError::Rejected { .. } => ErrorCode::BackendRejected,
            ClientError::Network(_) => ErrorCode::NetworkError,
            ClientError::Decode(_) => ErrorCode::BackendRejected,
            ClientError::Cancelled => ErrorCode::Cancelled,
            ClientError::RequestInFlight(_) => ErrorCode::InFlight,
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => ErrorCode::ConfigError,
            ClientError::Storage(_) => ErrorCode::StorageError,
        };
        CliError::new(code, message)
    }

    fn from_core(err: &CoreError) -> Self {
        let code = match err {
            CoreError::AuthRequired => ErrorCode::AuthRequired,
            CoreError::PrescriptionRequired { .. } => ErrorCode::PrescriptionRequired,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::InvalidPromoCode(_) => ErrorCode::InvalidPromoCode,
            CoreError::PaymentNotApplicable { .. } => ErrorCode::PaymentNotApplicable,
            CoreError::CancellationNotAllowed { .. } => ErrorCode::InvalidTransition,
            CoreError::Storage(_) => ErrorCode::StorageError,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        CliError::new(code, err.to_string())
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        CliError::from_client(err, GENERIC_FALLBACK)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from_core(&err)
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<StorageError> for CliError {
    fn from(err: StorageError) -> Self {
        CliError::new(ErrorCode::StorageError, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_client::NETWORK_ERROR_MESSAGE;

    #[test]
    fn test_backend_message_kept_verbatim() {
        let err = CliError::from_client(
            ClientError::Rejected {
                status: 422,
                message: Some("Amoxicillin is out of stock".into()),
            },
            "Failed to place order.",
        );
        assert_eq!(err.code, ErrorCode::BackendRejected);
        assert_eq!(err.message, "Amoxicillin is out of stock");
    }

    #[test]
    fn test_fallback_when_backend_silent() {
        let err = CliError::from_client(
            ClientError::TransitionRejected {
                status: 409,
                message: None,
            },
            "Failed to update order status.",
        );
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.message, "Failed to update order status.");
    }

    #[test]
    fn test_network_error_message() {
        let err: CliError = ClientError::Network("connection refused".into()).into();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(err.message, NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_core_errors_keep_their_code() {
        let err: CliError = ClientError::Core(CoreError::PrescriptionRequired {
            product_ids: vec!["amox-500".into()],
        })
        .into();
        assert_eq!(err.code, ErrorCode::PrescriptionRequired);
        assert!(err.message.contains("amox-500"));
    }

    #[test]
    fn test_serializes_screaming_snake_code() {
        let err = CliError::new(ErrorCode::PaymentNotApplicable, "nope");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "PAYMENT_NOT_APPLICABLE");
        assert_eq!(json["message"], "nope");
    }
}
