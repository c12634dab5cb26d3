pub mod auth;
pub mod documents;
pub mod folders;
pub mod github;
pub mod health;
pub mod reviews;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /users/me                                        current user (auth required)
///
/// /documents                                       list (?author_id), create
/// /documents/search                                search (?q=)
/// /documents/status/{status}                       list by status
/// /documents/{id}                                  get, update, delete
///
/// /folders                                         list, create
/// /folders/tree                                    folder tree with documents
///
/// /reviews                                         submit (reviewer or admin)
/// /reviews/document/{id}                           list for a document
///
/// /github/repos                                    list (?include_inactive), link (admin)
/// /github/repos/{id}                               update (admin)
/// /github/sync/{repo_id}                           pull (POST)
/// /github/submit/{document_id}                     push as pull request (POST)
/// ```
///
/// Reads are public; every write requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/documents", documents::router())
        .nest("/folders", folders::router())
        .nest("/reviews", reviews::router())
        .nest("/github", github::router())
}
