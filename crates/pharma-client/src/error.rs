//! # Client Error Types
//!
//! Error types for backend, configuration and persistence operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local rules    │  │   Backend       │  │     Transport           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core(..)       │  │  Transition-    │  │  Network                │ │
//! │  │  (auth, Rx,     │  │   Rejected      │  │  Decode                 │ │
//! │  │   empty cart,   │  │  Rejected       │  │                         │ │
//! │  │   lifecycle)    │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Concurrency    │  │     Storage             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Cancelled      │  │  Storage                │ │
//! │  │  InvalidUrl     │  │  RequestInFlight│  │                         │ │
//! │  │  ConfigLoad/Save│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried automatically. Each failure is reported once and
//! the user decides whether to try again.

use pharma_core::{CoreError, StorageError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shown for transport failures, where the backend never answered.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Client error type covering every failure a storefront or admin action can
/// produce.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Local Rule Violations
    // =========================================================================
    /// Rejected locally before any request was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Backend Refusals
    // =========================================================================
    /// The backend refused an order status change.
    #[error("Status change rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    TransitionRejected { status: u16, message: Option<String> },

    /// Any other non-success response.
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never got an answer.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a body we could not read.
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Concurrency
    // =========================================================================
    /// The owning view went away before the response arrived.
    #[error("Request cancelled")]
    Cancelled,

    /// The same action is already waiting for a response.
    #[error("{0} is already in progress")]
    RequestInFlight(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Persistence
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidUrl(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// The message to show the user.
    ///
    /// ## Rules
    /// - Backend refusal with a message: that message, verbatim
    /// - Backend refusal without one: `fallback`
    /// - Transport failure: "Network error. Please try again."
    /// - Anything else: the error's own description
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::TransitionRejected { message, .. }
            | ClientError::Rejected { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback)
                .to_string(),
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::Decode(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }

    /// Re-labels a generic refusal as a refused status change.
    pub(crate) fn into_transition_rejection(self) -> Self {
        match self {
            ClientError::Rejected { status, message } => {
                ClientError::TransitionRejected { status, message }
            }
            other => other,
        }
    }
}
