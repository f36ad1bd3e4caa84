use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::folders::handlers;
use crate::features::folders::services::FolderService;

/// Routes for the folders feature. All require an authenticated session.
pub fn routes(service: Arc<FolderService>) -> Router {
    Router::new()
        .route(
            "/api/folders",
            get(handlers::list_folders).post(handlers::create_folder),
        )
        .route(
            "/api/folders/{id}",
            put(handlers::update_folder).delete(handlers::delete_folder),
        )
        .route("/api/folders/{id}/download", get(handlers::download_folder))
        .with_state(service)
}
