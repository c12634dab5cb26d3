//! Route definitions for the `/github` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::github;
use crate::state::AppState;

/// Routes mounted at `/github`.
///
/// ```text
/// GET  /repos                   -> list_repos (?include_inactive)
/// POST /repos                   -> link_repo (admin)
/// PUT  /repos/{id}              -> update_repo (admin)
/// POST /sync/{repo_id}          -> sync_repo
/// POST /submit/{document_id}    -> submit_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/repos", get(github::list_repos).post(github::link_repo))
        .route("/repos/{id}", put(github::update_repo))
        .route("/sync/{repo_id}", post(github::sync_repo))
        .route("/submit/{document_id}", post(github::submit_document))
}
