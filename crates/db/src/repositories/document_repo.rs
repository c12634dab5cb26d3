//! Repository for the `documents` table.

use sqlx::PgPool;
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::DbId;

use crate::models::document::{Document, DocumentPatch, NewDocument};

/// Column list for documents queries.
pub(crate) const COLUMNS: &str = "id, title, content, path, status, author_id, \
    last_editor_id, reviewer_id, review_comments, github_path, github_sha, \
    metadata, created_at, updated_at";

/// Provides CRUD and search for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create(pool: &PgPool, input: &NewDocument) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (title, content, path, status, author_id, last_editor_id,
                 github_path, github_sha, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.path)
            .bind(input.status.as_str())
            .bind(input.author_id)
            .bind(input.last_editor_id)
            .bind(&input.github_path)
            .bind(&input.github_sha)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_path(
        pool: &PgPool,
        path: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE path = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(path)
            .fetch_optional(pool)
            .await
    }

    /// List documents with optional status and author filters, newest first.
    pub async fn list(
        pool: &PgPool,
        status: Option<DocumentStatus>,
        author_id: Option<DbId>,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR author_id = $2)
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(status.map(|s| s.as_str()))
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search over title, content and path.
    ///
    /// LIKE wildcards in the query are matched literally.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Document>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE title ILIKE $1 ESCAPE '\\'
                OR content ILIKE $1 ESCAPE '\\'
                OR path ILIKE $1 ESCAPE '\\'
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    /// Apply a patch. `updated_at` is refreshed but never moves backwards.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &DocumentPatch,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                path = COALESCE($4, path),
                status = COALESCE($5, status),
                last_editor_id = COALESCE($6, last_editor_id),
                github_path = COALESCE($7, github_path),
                github_sha = COALESCE($8, github_sha),
                metadata = COALESCE($9, metadata),
                updated_at = GREATEST(NOW(), updated_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.content)
            .bind(&patch.path)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.last_editor_id)
            .bind(&patch.github_path)
            .bind(&patch.github_sha)
            .bind(&patch.metadata)
            .fetch_optional(pool)
            .await
    }

    /// Delete a document. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `%`, `_` and `\` so they match literally in a LIKE pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
