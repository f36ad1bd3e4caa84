use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::activity::handlers;
use crate::features::activity::services::ActivityService;

/// Routes for the monitoring feature. Authenticated; the handler additionally
/// requires SUPER_ADMIN.
pub fn routes(service: Arc<ActivityService>) -> Router {
    Router::new()
        .route("/api/activity", get(handlers::list_activity))
        .with_state(service)
}
