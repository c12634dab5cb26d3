use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// POST /                        -> submit_review (reviewer or admin)
/// GET  /document/{document_id}  -> list_for_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::submit_review))
        .route("/document/{document_id}", get(reviews::list_for_document))
}
