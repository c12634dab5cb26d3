//! Handlers for the `/github` resource: linked repositories, pull and push.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use wikidocs_core::error::CoreError;
use wikidocs_core::types::DbId;
use wikidocs_db::models::github_repo::{
    CreateGithubRepo, GithubRepoPatch, NewGithubRepo, UpdateGithubRepo, DEFAULT_BRANCH,
};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListReposParams {
    #[serde(default)]
    pub include_inactive: bool,
}

fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))
}

// ---------------------------------------------------------------------------
// Linked repositories
// ---------------------------------------------------------------------------

/// GET /github/repos
///
/// Active repositories in link order; `?include_inactive=true` lists all.
/// Tokens are never returned.
pub async fn list_repos(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListReposParams>,
) -> AppResult<impl IntoResponse> {
    let repos = if params.include_inactive {
        state.store.list_repos().await?
    } else {
        state.store.list_active_repos().await?
    };
    Ok(Json(DataResponse { data: repos }))
}

/// POST /github/repos
///
/// Link a repository. The access token is sealed before it is stored.
pub async fn link_repo(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateGithubRepo>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized();
    validate_input(&input)?;

    let new_repo = NewGithubRepo {
        owner: input.owner,
        name: input.name,
        branch: input.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        token_ciphertext: state.cipher.seal(&input.token)?,
        is_active: true,
    };
    let repo = state.store.create_repo(&new_repo).await?;

    tracing::info!(
        repo_id = repo.id,
        repo = %repo.full_name(),
        user_id = admin.user_id,
        "GitHub repository linked",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: repo })))
}

/// PUT /github/repos/{id}
///
/// Change the branch, rotate the token, or (de)activate a repository.
pub async fn update_repo(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateGithubRepo>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized();
    validate_input(&input)?;

    let token_ciphertext = match input.token.as_deref() {
        Some(token) => Some(state.cipher.seal(token)?),
        None => None,
    };
    let patch = GithubRepoPatch {
        branch: input.branch,
        token_ciphertext,
        is_active: input.is_active,
    };
    let repo = state
        .store
        .update_repo(id, &patch)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "GithubRepo",
            id,
        })?;

    tracing::info!(
        repo_id = repo.id,
        is_active = repo.is_active,
        user_id = admin.user_id,
        "GitHub repository updated",
    );
    Ok(Json(DataResponse { data: repo }))
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// POST /github/sync/{repo_id}
///
/// Pull every markdown file of the repository's branch into the store.
pub async fn sync_repo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(repo_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = state.sync.sync_from_repo(repo_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /github/submit/{document_id}
///
/// Push an approved document to a new branch of the first active repository
/// and open a pull request.
pub async fn submit_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let submission = state
        .sync
        .submit_to_github(document_id, auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: submission }))
}
