//! The persistence interface shared by the PostgreSQL and in-memory stores.
//!
//! Every method is a single atomic operation. The only compound write is
//! [`DocumentStore::record_review`], which inserts a review and moves the
//! reviewed document in one step.

use async_trait::async_trait;
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::DbId;

use crate::models::document::{Document, DocumentPatch, NewDocument};
use crate::models::folder::{CreateFolder, Folder};
use crate::models::github_repo::{GithubRepo, GithubRepoPatch, NewGithubRepo};
use crate::models::review::{NewReview, RecordedReview, Review};
use crate::models::user::{CreateUser, User};

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A unique key (document path, folder path, username) is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unique constraint");
                return Self::Conflict(format!("Duplicate value violates {constraint}"));
            }
        }
        Self::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Verify the backing storage is reachable.
    async fn ping(&self) -> StoreResult<()>;

    // -- users --

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    // -- documents --

    async fn find_document(&self, id: DbId) -> StoreResult<Option<Document>>;

    async fn find_document_by_path(&self, path: &str) -> StoreResult<Option<Document>>;

    /// All documents, most recently updated first.
    async fn list_documents(&self) -> StoreResult<Vec<Document>>;

    async fn list_documents_by_status(&self, status: DocumentStatus)
        -> StoreResult<Vec<Document>>;

    async fn list_documents_by_author(&self, author_id: DbId) -> StoreResult<Vec<Document>>;

    /// Case-insensitive substring match over title, content and path.
    async fn search_documents(&self, query: &str) -> StoreResult<Vec<Document>>;

    async fn create_document(&self, input: &NewDocument) -> StoreResult<Document>;

    /// Apply a patch and refresh `updated_at`. `None` if the document is gone.
    async fn update_document(
        &self,
        id: DbId,
        patch: &DocumentPatch,
    ) -> StoreResult<Option<Document>>;

    /// Returns `true` if a row was deleted. Reviews are left in place.
    async fn delete_document(&self, id: DbId) -> StoreResult<bool>;

    // -- folders --

    async fn find_folder_by_path(&self, path: &str) -> StoreResult<Option<Folder>>;

    /// All folders ordered by path.
    async fn list_folders(&self) -> StoreResult<Vec<Folder>>;

    async fn create_folder(&self, input: &CreateFolder) -> StoreResult<Folder>;

    // -- repositories --

    async fn find_repo(&self, id: DbId) -> StoreResult<Option<GithubRepo>>;

    async fn list_repos(&self) -> StoreResult<Vec<GithubRepo>>;

    /// Active repositories, lowest id first.
    async fn list_active_repos(&self) -> StoreResult<Vec<GithubRepo>>;

    async fn create_repo(&self, input: &NewGithubRepo) -> StoreResult<GithubRepo>;

    async fn update_repo(
        &self,
        id: DbId,
        patch: &GithubRepoPatch,
    ) -> StoreResult<Option<GithubRepo>>;

    // -- reviews --

    /// Reviews for a document, newest first.
    async fn list_reviews_for_document(&self, document_id: DbId) -> StoreResult<Vec<Review>>;

    /// Insert a review and move its document to the decided status.
    ///
    /// The write only happens if the document still has status `expected`;
    /// otherwise nothing is written and `None` is returned.
    async fn record_review(
        &self,
        input: &NewReview,
        expected: DocumentStatus,
    ) -> StoreResult<Option<RecordedReview>>;
}
