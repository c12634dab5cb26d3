//! Repository for the `github_repos` table.

use sqlx::PgPool;
use wikidocs_core::types::DbId;

use crate::models::github_repo::{GithubRepo, GithubRepoPatch, NewGithubRepo};

/// Column list for github_repos queries.
const COLUMNS: &str = "id, owner, name, branch, token_ciphertext, is_active, created_at";

pub struct GithubRepoRepo;

impl GithubRepoRepo {
    pub async fn create(pool: &PgPool, input: &NewGithubRepo) -> Result<GithubRepo, sqlx::Error> {
        let query = format!(
            "INSERT INTO github_repos (owner, name, branch, token_ciphertext, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GithubRepo>(&query)
            .bind(&input.owner)
            .bind(&input.name)
            .bind(&input.branch)
            .bind(&input.token_ciphertext)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<GithubRepo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM github_repos WHERE id = $1");
        sqlx::query_as::<_, GithubRepo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List repositories, optionally only active ones, lowest id first.
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<GithubRepo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM github_repos
             WHERE (NOT $1 OR is_active)
             ORDER BY id"
        );
        sqlx::query_as::<_, GithubRepo>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &GithubRepoPatch,
    ) -> Result<Option<GithubRepo>, sqlx::Error> {
        let query = format!(
            "UPDATE github_repos SET
                branch = COALESCE($2, branch),
                token_ciphertext = COALESCE($3, token_ciphertext),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GithubRepo>(&query)
            .bind(id)
            .bind(&patch.branch)
            .bind(&patch.token_ciphertext)
            .bind(patch.is_active)
            .fetch_optional(pool)
            .await
    }
}
