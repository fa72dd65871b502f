use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    /// Missing signature headers, bad signature or stale timestamp.
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// The store rejected or could not run the write; the sender should retry.
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DomainError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Client-input errors: no retry helps, the request itself is invalid.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::MalformedPayload { .. })
    }
}
