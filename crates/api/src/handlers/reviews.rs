use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use wikidocs_core::types::DbId;
use wikidocs_db::models::review::SubmitReview;
use wikidocs_db::workflow;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::RequireReviewer;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /reviews
///
/// Record a decision on a document that is pending review. Returns the
/// review together with the updated document.
pub async fn submit_review(
    RequireReviewer(reviewer): RequireReviewer,
    State(state): State<AppState>,
    AppJson(input): AppJson<SubmitReview>,
) -> AppResult<impl IntoResponse> {
    let recorded = workflow::submit_review(state.store.as_ref(), reviewer.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: recorded })))
}

/// GET /reviews/document/{document_id}
///
/// Newest first. Reviews of a deleted document are still listed.
pub async fn list_for_document(
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let reviews = workflow::list_reviews(state.store.as_ref(), document_id).await?;
    Ok(Json(DataResponse { data: reviews }))
}
