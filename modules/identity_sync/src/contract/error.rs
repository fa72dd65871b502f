use thiserror::Error;

/// Errors that are safe to expose to other crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentitySyncError {
    #[error("Webhook rejected: {reason}")]
    Unauthorized { reason: String },

    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error")]
    Internal,
}

impl IdentitySyncError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for IdentitySyncError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Unauthorized { reason } => Self::unauthorized(reason),
            MalformedPayload { message } => Self::invalid_event(message),
            Config { message } => Self::Config { message },
            Storage { .. } => Self::internal(),
        }
    }
}
