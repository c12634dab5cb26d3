//! In-memory implementation of [`DocumentStore`].
//!
//! All tables live behind one `RwLock`, so every method (including the
//! compound review write) runs as a single critical section. State is lost
//! when the store is dropped.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::{DbId, Timestamp};

use crate::models::document::{Document, DocumentPatch, NewDocument};
use crate::models::folder::{CreateFolder, Folder};
use crate::models::github_repo::{GithubRepo, GithubRepoPatch, NewGithubRepo};
use crate::models::review::{NewReview, RecordedReview, Review};
use crate::models::user::{CreateUser, User};
use crate::store::{DocumentStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    users: BTreeMap<DbId, User>,
    documents: BTreeMap<DbId, Document>,
    folders: BTreeMap<DbId, Folder>,
    repos: BTreeMap<DbId, GithubRepo>,
    reviews: BTreeMap<DbId, Review>,
    last_id: DbId,
}

impl Tables {
    /// Ids are shared across tables; they only need to be unique per table.
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn path_taken(&self, path: &str, except: Option<DbId>) -> bool {
        self.documents
            .values()
            .any(|d| d.path == path && Some(d.id) != except)
    }
}

/// In-memory document store.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `updated_at` never moves backwards, even if the clock does.
fn touch(previous: Timestamp) -> Timestamp {
    Utc::now().max(previous)
}

fn newest_first(mut docs: Vec<Document>) -> Vec<Document> {
    docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
    docs
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }
        if tables.users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }
        let user = User {
            id: tables.next_id(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            avatar: None,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_document(&self, id: DbId) -> StoreResult<Option<Document>> {
        Ok(self.tables.read().await.documents.get(&id).cloned())
    }

    async fn find_document_by_path(&self, path: &str) -> StoreResult<Option<Document>> {
        let tables = self.tables.read().await;
        Ok(tables.documents.values().find(|d| d.path == path).cloned())
    }

    async fn list_documents(&self) -> StoreResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.documents.values().cloned().collect()))
    }

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> StoreResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .documents
                .values()
                .filter(|d| d.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn list_documents_by_author(&self, author_id: DbId) -> StoreResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .documents
                .values()
                .filter(|d| d.author_id == author_id)
                .cloned()
                .collect(),
        ))
    }

    async fn search_documents(&self, query: &str) -> StoreResult<Vec<Document>> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .documents
                .values()
                .filter(|d| {
                    d.title.to_lowercase().contains(&needle)
                        || d.content.to_lowercase().contains(&needle)
                        || d.path.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn create_document(&self, input: &NewDocument) -> StoreResult<Document> {
        let mut tables = self.tables.write().await;
        if tables.path_taken(&input.path, None) {
            return Err(StoreError::Conflict(format!(
                "A document already exists at path '{}'",
                input.path
            )));
        }
        let now = Utc::now();
        let document = Document {
            id: tables.next_id(),
            title: input.title.clone(),
            content: input.content.clone(),
            path: input.path.clone(),
            status: input.status,
            author_id: input.author_id,
            last_editor_id: input.last_editor_id,
            reviewer_id: None,
            review_comments: None,
            github_path: input.github_path.clone(),
            github_sha: input.github_sha.clone(),
            metadata: input.metadata.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        id: DbId,
        patch: &DocumentPatch,
    ) -> StoreResult<Option<Document>> {
        let mut tables = self.tables.write().await;
        if let Some(path) = &patch.path {
            if tables.path_taken(path, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "A document already exists at path '{path}'"
                )));
            }
        }
        let Some(doc) = tables.documents.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = &patch.title {
            doc.title = title.clone();
        }
        if let Some(content) = &patch.content {
            doc.content = content.clone();
        }
        if let Some(path) = &patch.path {
            doc.path = path.clone();
        }
        if let Some(status) = patch.status {
            doc.status = status;
        }
        if let Some(editor) = patch.last_editor_id {
            doc.last_editor_id = Some(editor);
        }
        if let Some(github_path) = &patch.github_path {
            doc.github_path = Some(github_path.clone());
        }
        if let Some(github_sha) = &patch.github_sha {
            doc.github_sha = Some(github_sha.clone());
        }
        if let Some(metadata) = &patch.metadata {
            doc.metadata = metadata.clone();
        }
        doc.updated_at = touch(doc.updated_at);
        Ok(Some(doc.clone()))
    }

    async fn delete_document(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables.write().await.documents.remove(&id).is_some())
    }

    async fn find_folder_by_path(&self, path: &str) -> StoreResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables.folders.values().find(|f| f.path == path).cloned())
    }

    async fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut folders: Vec<Folder> = tables.folders.values().cloned().collect();
        folders.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(folders)
    }

    async fn create_folder(&self, input: &CreateFolder) -> StoreResult<Folder> {
        let mut tables = self.tables.write().await;
        if tables.folders.values().any(|f| f.path == input.path) {
            return Err(StoreError::Conflict(format!(
                "A folder already exists at path '{}'",
                input.path
            )));
        }
        let folder = Folder {
            id: tables.next_id(),
            name: input.name.clone(),
            path: input.path.clone(),
            parent_path: input.parent_path.clone(),
            description: input.description.clone(),
            created_at: Utc::now(),
        };
        tables.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn find_repo(&self, id: DbId) -> StoreResult<Option<GithubRepo>> {
        Ok(self.tables.read().await.repos.get(&id).cloned())
    }

    async fn list_repos(&self) -> StoreResult<Vec<GithubRepo>> {
        Ok(self.tables.read().await.repos.values().cloned().collect())
    }

    async fn list_active_repos(&self) -> StoreResult<Vec<GithubRepo>> {
        let tables = self.tables.read().await;
        Ok(tables
            .repos
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn create_repo(&self, input: &NewGithubRepo) -> StoreResult<GithubRepo> {
        let mut tables = self.tables.write().await;
        let repo = GithubRepo {
            id: tables.next_id(),
            owner: input.owner.clone(),
            name: input.name.clone(),
            branch: input.branch.clone(),
            token_ciphertext: input.token_ciphertext.clone(),
            is_active: input.is_active,
            created_at: Utc::now(),
        };
        tables.repos.insert(repo.id, repo.clone());
        Ok(repo)
    }

    async fn update_repo(
        &self,
        id: DbId,
        patch: &GithubRepoPatch,
    ) -> StoreResult<Option<GithubRepo>> {
        let mut tables = self.tables.write().await;
        let Some(repo) = tables.repos.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(branch) = &patch.branch {
            repo.branch = branch.clone();
        }
        if let Some(token) = &patch.token_ciphertext {
            repo.token_ciphertext = token.clone();
        }
        if let Some(active) = patch.is_active {
            repo.is_active = active;
        }
        Ok(Some(repo.clone()))
    }

    async fn list_reviews_for_document(&self, document_id: DbId) -> StoreResult<Vec<Review>> {
        let tables = self.tables.read().await;
        // BTreeMap iterates in insertion (id) order; reverse for newest first.
        Ok(tables
            .reviews
            .values()
            .rev()
            .filter(|r| r.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn record_review(
        &self,
        input: &NewReview,
        expected: DocumentStatus,
    ) -> StoreResult<Option<RecordedReview>> {
        let mut tables = self.tables.write().await;
        match tables.documents.get(&input.document_id) {
            Some(doc) if doc.status == expected => {}
            _ => return Ok(None),
        }

        let review = Review {
            id: tables.next_id(),
            document_id: input.document_id,
            reviewer_id: input.reviewer_id,
            status: input.status,
            comments: input.comments.clone(),
            changes: input.changes.clone(),
            created_at: Utc::now(),
        };
        tables.reviews.insert(review.id, review.clone());

        let Some(doc) = tables.documents.get_mut(&input.document_id) else {
            return Ok(None);
        };
        doc.status = input.status.resulting_status();
        doc.review_comments = input.comments.clone();
        doc.reviewer_id = Some(input.reviewer_id);
        doc.updated_at = touch(doc.updated_at);

        Ok(Some(RecordedReview {
            review,
            document: doc.clone(),
        }))
    }
}
