use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::features::documents::handlers;
use crate::features::documents::services::DocumentService;
use crate::shared::constants::MAX_DOCUMENT_SIZE;

/// Routes for the documents feature. All require an authenticated session.
pub fn routes(service: Arc<DocumentService>) -> Router {
    // Allow some headroom over the document limit for multipart framing.
    let upload_limit = DefaultBodyLimit::max(MAX_DOCUMENT_SIZE + 64 * 1024);

    Router::new()
        .route(
            "/api/upload",
            post(handlers::upload_document).layer(upload_limit),
        )
        .route("/api/documents/search", get(handlers::search_documents))
        .route(
            "/api/documents/{id}",
            put(handlers::update_document).delete(handlers::delete_document),
        )
        .route(
            "/api/documents/{id}/download",
            get(handlers::download_document),
        )
        .route("/api/documents/bulk-delete", post(handlers::bulk_delete))
        .with_state(service)
}
