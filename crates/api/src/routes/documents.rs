//! Route definitions for the `/documents` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /                   -> list_documents (?author_id)
/// POST   /                   -> create_document
/// GET    /search             -> search_documents (?q=)
/// GET    /status/{status}    -> list_by_status
/// GET    /{id}               -> get_document
/// PUT    /{id}               -> update_document
/// DELETE /{id}               -> delete_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(documents::list_documents).post(documents::create_document),
        )
        .route("/search", get(documents::search_documents))
        .route("/status/{status}", get(documents::list_by_status))
        .route(
            "/{id}",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
}
