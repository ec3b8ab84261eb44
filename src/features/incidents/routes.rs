use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::incidents::handlers::{
    method_not_allowed, submit_guided_report, submit_quick_report,
};
use crate::features::incidents::services::SubmissionService;

/// Create routes for the report submission endpoints
pub fn routes(service: Arc<SubmissionService>, max_request_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/reports/guided",
            post(submit_guided_report).fallback(method_not_allowed),
        )
        .route(
            "/api/reports/quick",
            post(submit_quick_report).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(max_request_body_size))
        .with_state(service)
}
