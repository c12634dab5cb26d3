//! Repository for the `folders` table.

use sqlx::PgPool;

use crate::models::folder::{CreateFolder, Folder};

/// Column list for folders queries.
const COLUMNS: &str = "id, name, path, parent_path, description, created_at";

pub struct FolderRepo;

impl FolderRepo {
    pub async fn create(pool: &PgPool, input: &CreateFolder) -> Result<Folder, sqlx::Error> {
        let query = format!(
            "INSERT INTO folders (name, path, parent_path, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&query)
            .bind(&input.name)
            .bind(&input.path)
            .bind(&input.parent_path)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_path(pool: &PgPool, path: &str) -> Result<Option<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders WHERE path = $1");
        sqlx::query_as::<_, Folder>(&query)
            .bind(path)
            .fetch_optional(pool)
            .await
    }

    /// List all folders ordered by path.
    pub async fn list(pool: &PgPool) -> Result<Vec<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders ORDER BY path");
        sqlx::query_as::<_, Folder>(&query).fetch_all(pool).await
    }
}
