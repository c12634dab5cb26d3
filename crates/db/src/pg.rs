//! PostgreSQL implementation of [`DocumentStore`] on top of the repositories.

use async_trait::async_trait;
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::DbId;

use crate::models::document::{Document, DocumentPatch, NewDocument};
use crate::models::folder::{CreateFolder, Folder};
use crate::models::github_repo::{GithubRepo, GithubRepoPatch, NewGithubRepo};
use crate::models::review::{NewReview, RecordedReview, Review};
use crate::models::user::{CreateUser, User};
use crate::repositories::{DocumentRepo, FolderRepo, GithubRepoRepo, ReviewRepo, UserRepo};
use crate::store::{DocumentStore, StoreResult};
use crate::DbPool;

/// Store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_document(&self, id: DbId) -> StoreResult<Option<Document>> {
        Ok(DocumentRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_document_by_path(&self, path: &str) -> StoreResult<Option<Document>> {
        Ok(DocumentRepo::find_by_path(&self.pool, path).await?)
    }

    async fn list_documents(&self) -> StoreResult<Vec<Document>> {
        Ok(DocumentRepo::list(&self.pool, None, None).await?)
    }

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> StoreResult<Vec<Document>> {
        Ok(DocumentRepo::list(&self.pool, Some(status), None).await?)
    }

    async fn list_documents_by_author(&self, author_id: DbId) -> StoreResult<Vec<Document>> {
        Ok(DocumentRepo::list(&self.pool, None, Some(author_id)).await?)
    }

    async fn search_documents(&self, query: &str) -> StoreResult<Vec<Document>> {
        Ok(DocumentRepo::search(&self.pool, query).await?)
    }

    async fn create_document(&self, input: &NewDocument) -> StoreResult<Document> {
        Ok(DocumentRepo::create(&self.pool, input).await?)
    }

    async fn update_document(
        &self,
        id: DbId,
        patch: &DocumentPatch,
    ) -> StoreResult<Option<Document>> {
        Ok(DocumentRepo::update(&self.pool, id, patch).await?)
    }

    async fn delete_document(&self, id: DbId) -> StoreResult<bool> {
        Ok(DocumentRepo::delete(&self.pool, id).await?)
    }

    async fn find_folder_by_path(&self, path: &str) -> StoreResult<Option<Folder>> {
        Ok(FolderRepo::find_by_path(&self.pool, path).await?)
    }

    async fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        Ok(FolderRepo::list(&self.pool).await?)
    }

    async fn create_folder(&self, input: &CreateFolder) -> StoreResult<Folder> {
        Ok(FolderRepo::create(&self.pool, input).await?)
    }

    async fn find_repo(&self, id: DbId) -> StoreResult<Option<GithubRepo>> {
        Ok(GithubRepoRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_repos(&self) -> StoreResult<Vec<GithubRepo>> {
        Ok(GithubRepoRepo::list(&self.pool, false).await?)
    }

    async fn list_active_repos(&self) -> StoreResult<Vec<GithubRepo>> {
        Ok(GithubRepoRepo::list(&self.pool, true).await?)
    }

    async fn create_repo(&self, input: &NewGithubRepo) -> StoreResult<GithubRepo> {
        Ok(GithubRepoRepo::create(&self.pool, input).await?)
    }

    async fn update_repo(
        &self,
        id: DbId,
        patch: &GithubRepoPatch,
    ) -> StoreResult<Option<GithubRepo>> {
        Ok(GithubRepoRepo::update(&self.pool, id, patch).await?)
    }

    async fn list_reviews_for_document(&self, document_id: DbId) -> StoreResult<Vec<Review>> {
        Ok(ReviewRepo::list_by_document(&self.pool, document_id).await?)
    }

    async fn record_review(
        &self,
        input: &NewReview,
        expected: DocumentStatus,
    ) -> StoreResult<Option<RecordedReview>> {
        Ok(ReviewRepo::record(&self.pool, input, expected).await?)
    }
}
