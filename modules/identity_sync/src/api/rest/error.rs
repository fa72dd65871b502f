use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

pub const CODE_UNAUTHORIZED: &str = "IDENTITY_SYNC_UNAUTHORIZED";
pub const CODE_MALFORMED_PAYLOAD: &str = "IDENTITY_SYNC_MALFORMED_PAYLOAD";
pub const CODE_STORAGE: &str = "IDENTITY_SYNC_STORAGE";
pub const CODE_CONFIG: &str = "IDENTITY_SYNC_CONFIG";

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse.
///
/// Invalid signatures and malformed payloads are client errors (400), so the
/// sender does not retry them. Storage failures are 500 so it does.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Unauthorized { reason } => from_parts(
            StatusCode::BAD_REQUEST,
            CODE_UNAUTHORIZED,
            "Webhook verification failed",
            reason.clone(),
            instance,
        ),
        DomainError::MalformedPayload { message } => from_parts(
            StatusCode::BAD_REQUEST,
            CODE_MALFORMED_PAYLOAD,
            "Malformed payload",
            message.clone(),
            instance,
        ),
        // Already logged with event context by the service; details stay internal.
        DomainError::Storage { .. } => from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            CODE_STORAGE,
            "Internal error",
            "The user store could not apply the event",
            instance,
        ),
        DomainError::Config { .. } => {
            tracing::error!(error = ?e, "Configuration error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                CODE_CONFIG,
                "Internal error",
                "The webhook endpoint is misconfigured",
                instance,
            )
        }
    }
}
