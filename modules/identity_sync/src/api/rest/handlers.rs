use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderMap, Uri},
    response::Json,
    Extension,
};
use tracing::{debug, info};

use crate::api::rest::dto::WebhookAck;
use crate::api::rest::error::map_domain_error;
use crate::api::rest::problem::ProblemResponse;
use crate::contract::model::SyncOutcome;
use crate::domain::service::Service;
use crate::domain::signature::WebhookHeaders;

const REQUEST_ID_HEADER: &str = "x-request-id";

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Receive one signed identity webhook.
///
/// The body is taken as raw bytes: the signature covers the exact payload, so
/// nothing may parse or re-encode it first.
pub async fn receive_webhook(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ProblemResponse> {
    debug!(body_len = body.len(), "Received identity webhook");

    let signed = WebhookHeaders::from_lookup(|name| header_str(&headers, name));

    match svc.handle(&body, &signed).await {
        Ok(outcome) => {
            match &outcome {
                SyncOutcome::Ignored { event_type } => {
                    info!(event_type = %event_type, "Acknowledged unhandled event type")
                }
                other => debug!(outcome = ?other, "Webhook handled"),
            }
            Ok(Json(WebhookAck::ok()))
        }
        Err(e) => {
            let mut problem = map_domain_error(&e, uri.path());
            if let Some(request_id) = header_str(&headers, REQUEST_ID_HEADER) {
                problem.0 = problem.0.with_request_id(request_id);
            }
            Err(problem)
        }
    }
}
