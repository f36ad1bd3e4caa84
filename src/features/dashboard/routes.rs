use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Routes for the dashboard feature. Requires an authenticated session.
pub fn routes(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard", get(handlers::get_dashboard))
        .with_state(service)
}
