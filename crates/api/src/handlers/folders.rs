use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use wikidocs_db::models::folder::CreateFolder;
use wikidocs_db::workflow;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /folders
///
/// Flat list ordered by path.
pub async fn list_folders(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let folders = state.store.list_folders().await?;
    Ok(Json(DataResponse { data: folders }))
}

/// GET /folders/tree
///
/// Folders nested by parent path with their documents attached. Documents
/// outside any known folder are returned under `unfiled`.
pub async fn folder_tree(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tree = workflow::folder_tree(state.store.as_ref()).await?;
    Ok(Json(DataResponse { data: tree }))
}

/// POST /folders
pub async fn create_folder(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateFolder>,
) -> AppResult<impl IntoResponse> {
    let folder = workflow::create_folder(state.store.as_ref(), &input).await?;
    tracing::info!(
        folder_id = folder.id,
        path = %folder.path,
        user_id = auth.user_id,
        "Folder created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: folder })))
}
