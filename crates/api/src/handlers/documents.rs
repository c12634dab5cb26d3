//! Handlers for the `/documents` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::DbId;
use wikidocs_db::models::document::{CreateDocument, Document, DocumentView, UpdateDocument};
use wikidocs_db::workflow;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Query param types
-------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct ListDocumentsParams {
    pub author_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

fn views(documents: Vec<Document>) -> Vec<DocumentView> {
    documents.into_iter().map(DocumentView::from).collect()
}

/* --------------------------------------------------------------------------
Reads
-------------------------------------------------------------------------- */

/// GET /documents
///
/// All documents, most recently updated first. `?author_id=` narrows to one
/// author.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsParams>,
) -> AppResult<impl IntoResponse> {
    let documents = match params.author_id {
        Some(author_id) => state.store.list_documents_by_author(author_id).await?,
        None => state.store.list_documents().await?,
    };
    Ok(Json(DataResponse {
        data: views(documents),
    }))
}

/// GET /documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = workflow::get_document(state.store.as_ref(), id).await?;
    Ok(Json(DataResponse {
        data: DocumentView::from(document),
    }))
}

/// GET /documents/search?q=
///
/// Case-insensitive substring match over title, content and path. A missing
/// or blank `q` is a validation error.
pub async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.q.unwrap_or_default();
    let documents = workflow::search_documents(state.store.as_ref(), &query).await?;
    Ok(Json(DataResponse {
        data: views(documents),
    }))
}

/// GET /documents/status/{status}
pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<impl IntoResponse> {
    let status = DocumentStatus::parse(&status)?;
    let documents = state.store.list_documents_by_status(status).await?;
    Ok(Json(DataResponse {
        data: views(documents),
    }))
}

/* --------------------------------------------------------------------------
Writes
-------------------------------------------------------------------------- */

/// POST /documents
///
/// Create a draft authored by the caller.
pub async fn create_document(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateDocument>,
) -> AppResult<impl IntoResponse> {
    let document = workflow::create_document(state.store.as_ref(), auth.user_id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DocumentView::from(document),
        }),
    ))
}

/// PUT /documents/{id}
///
/// Edit a document. A status change must be an author transition
/// (e.g. `draft` to `pending_review`); review outcomes go through `/reviews`.
pub async fn update_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateDocument>,
) -> AppResult<impl IntoResponse> {
    let document =
        workflow::update_document(state.store.as_ref(), auth.user_id, id, &input).await?;
    Ok(Json(DataResponse {
        data: DocumentView::from(document),
    }))
}

/// DELETE /documents/{id}
pub async fn delete_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    workflow::delete_document(state.store.as_ref(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
