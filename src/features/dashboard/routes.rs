use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;
use crate::features::incidents::handlers::method_not_allowed;

/// Create admin dashboard routes (all require the admin role)
pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard/incidents", get(handlers::list_incidents))
        .route(
            "/api/dashboard/incidents/{id}/status",
            patch(handlers::update_incident_status),
        )
        .route("/api/dashboard/users", get(handlers::list_users))
        .route(
            "/api/dashboard/reports",
            post(handlers::create_generated_report).fallback(method_not_allowed),
        )
        .with_state(dashboard_service)
}
