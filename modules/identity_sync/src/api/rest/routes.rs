use std::sync::Arc;

use axum::{routing::post, Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the webhook endpoint on `path`.
pub fn register_routes(router: Router, service: Arc<Service>, path: &str) -> Router {
    router.route(
        path,
        post(handlers::receive_webhook).layer(Extension(service)),
    )
}
