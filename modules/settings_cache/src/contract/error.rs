//! Contract error types for the remote settings gateway
//!
//! These errors are transport-agnostic. The cache never lets them escape to
//! consumers as failures; they are surfaced only as flags on a binding view.

use thiserror::Error;

/// Failure reported by a [`RemoteSettingsGateway`](super::RemoteSettingsGateway)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No valid session
    #[error("Not authenticated")]
    Unauthenticated,

    /// Save payload rejected by the backend
    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    /// Network or storage failure
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Backend answered with data that could not be understood
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

impl GatewayError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Whether the failure means there is no signed-in user
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}
