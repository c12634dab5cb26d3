//! Folder entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wikidocs_core::folder_tree::TreeFolder;
use wikidocs_core::types::{DbId, Timestamp};

/// A row from the `folders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Folder {
    pub id: DbId,
    pub name: String,
    pub path: String,
    /// `None` for root folders.
    pub parent_path: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl TreeFolder for Folder {
    fn path(&self) -> &str {
        &self.path
    }

    fn parent_path(&self) -> Option<&str> {
        self.parent_path.as_deref()
    }
}

/// DTO for creating a new folder.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFolder {
    #[validate(length(min = 1, max = 200, message = "Folder name must be 1-200 characters"))]
    pub name: String,
    pub path: String,
    /// Derived from the path's directory prefix when omitted.
    pub parent_path: Option<String>,
    pub description: Option<String>,
}
