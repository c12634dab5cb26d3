use axum::routing::get;
use axum::Router;

use crate::handlers::folders;
use crate::state::AppState;

/// Routes mounted at `/folders`.
///
/// ```text
/// GET  /        -> list_folders
/// POST /        -> create_folder
/// GET  /tree    -> folder_tree
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(folders::list_folders).post(folders::create_folder))
        .route("/tree", get(folders::folder_tree))
}
