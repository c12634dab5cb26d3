//! Pull and push between the document store and a linked repository.
//!
//! Pull walks the repository tree and upserts every markdown file as a
//! document keyed by path. Push writes one approved document to a fresh
//! branch and opens a pull request against the repository's base branch.
//! Neither flow is transactional; see the individual operations for what
//! survives a failure part-way through.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use wikidocs_core::error::CoreError;
use wikidocs_core::naming::{
    document_path_from_remote, is_markdown_file, remote_path_for_document,
    submission_branch_name, title_from_file_name, validate_path, validate_title,
};
use wikidocs_core::secrets::TokenCipher;
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::DbId;
use wikidocs_db::models::document::{Document, DocumentPatch, NewDocument};
use wikidocs_db::models::github_repo::GithubRepo;
use wikidocs_db::{DocumentStore, StoreError};

use crate::api::GitHubApiError;
use crate::host::{
    ContentEntry, EntryKind, FileWrite, NewPullRequest, RepoCoordinates, RepoHost,
};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("GitHub request failed: {0}")]
    Remote(#[from] GitHubApiError),
}

/// Tunables for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Status given to documents created by a pull.
    pub pulled_status: DocumentStatus,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pulled_status: DocumentStatus::Draft,
        }
    }
}

/// What a pull did to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncedDocument {
    pub action: SyncAction,
    pub document: Document,
}

/// Outcome of one pull.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub repo_id: DbId,
    /// Markdown files imported, whether or not they changed anything.
    pub synced_count: usize,
    pub documents: Vec<SyncedDocument>,
    /// Remote paths that were seen but not imported.
    pub skipped: Vec<String>,
}

/// Reference to the pull request a push opened.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub number: u64,
    pub url: String,
    pub branch: String,
    pub github_path: String,
    pub github_sha: String,
}

pub struct SyncEngine {
    store: Arc<dyn DocumentStore>,
    host: Arc<dyn RepoHost>,
    cipher: TokenCipher,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        host: Arc<dyn RepoHost>,
        cipher: TokenCipher,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            host,
            cipher,
            config,
        }
    }

    fn coordinates(&self, repo: &GithubRepo) -> Result<RepoCoordinates, SyncError> {
        Ok(RepoCoordinates {
            owner: repo.owner.clone(),
            name: repo.name.clone(),
            token: self.cipher.open(&repo.token_ciphertext)?,
        })
    }

    // -----------------------------------------------------------------------
    // Pull
    // -----------------------------------------------------------------------

    /// Import every markdown file of a repository's branch.
    ///
    /// Documents written before a failure stay written; re-running the pull
    /// picks up where it stopped.
    pub async fn sync_from_repo(
        &self,
        repo_id: DbId,
        actor: DbId,
    ) -> Result<SyncReport, SyncError> {
        let repo = self
            .store
            .find_repo(repo_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "GithubRepo",
                id: repo_id,
            })?;
        let coords = self.coordinates(&repo)?;

        tracing::info!(
            repo_id,
            repo = %repo.full_name(),
            branch = %repo.branch,
            "Starting pull",
        );

        let mut report = SyncReport {
            repo_id,
            synced_count: 0,
            documents: Vec::new(),
            skipped: Vec::new(),
        };

        // Directories still to list, depth-first.
        let mut pending = vec![String::new()];
        while let Some(dir) = pending.pop() {
            let entries = self
                .host
                .list_directory(&coords, &dir, &repo.branch)
                .await?;

            let mut subdirs = Vec::new();
            for entry in entries {
                match entry.kind {
                    EntryKind::Dir => subdirs.push(entry.path),
                    EntryKind::File if is_markdown_file(&entry.name) => {
                        self.import_file(&coords, &repo, &entry, actor, &mut report)
                            .await?;
                    }
                    _ => {}
                }
            }
            // Reverse so the first listed subdirectory is walked first.
            pending.extend(subdirs.into_iter().rev());
        }

        report.synced_count = report.documents.len();
        tracing::info!(
            repo_id,
            synced = report.synced_count,
            skipped = report.skipped.len(),
            "Pull finished",
        );
        Ok(report)
    }

    async fn import_file(
        &self,
        coords: &RepoCoordinates,
        repo: &GithubRepo,
        entry: &ContentEntry,
        actor: DbId,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let file = match self.host.get_file(coords, &entry.path, &repo.branch).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                tracing::debug!(path = %entry.path, "File disappeared during pull");
                report.skipped.push(entry.path.clone());
                return Ok(());
            }
            // Only this file is unreadable; the walk goes on.
            Err(err @ (GitHubApiError::ContentUnavailable(_) | GitHubApiError::Decode(_))) => {
                tracing::warn!(path = %entry.path, error = %err, "Skipping unreadable file");
                report.skipped.push(entry.path.clone());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let Ok(content) = String::from_utf8(file.bytes) else {
            tracing::warn!(path = %entry.path, "Skipping file that is not valid UTF-8");
            report.skipped.push(entry.path.clone());
            return Ok(());
        };

        let path = document_path_from_remote(&entry.path);
        let title = title_from_file_name(&entry.name);
        if validate_path(&path).is_err() || validate_title(&title).is_err() {
            tracing::warn!(path = %entry.path, "Skipping file with unusable path or title");
            report.skipped.push(entry.path.clone());
            return Ok(());
        }

        let (action, document) = match self.store.find_document_by_path(&path).await? {
            Some(existing)
                if existing.github_sha.as_deref() == Some(file.sha.as_str())
                    && existing.github_path.as_deref() == Some(entry.path.as_str())
                    && existing.content == content =>
            {
                (SyncAction::Unchanged, existing)
            }
            Some(existing) => {
                let patch = DocumentPatch {
                    content: Some(content),
                    last_editor_id: Some(actor),
                    github_path: Some(entry.path.clone()),
                    github_sha: Some(file.sha),
                    ..Default::default()
                };
                let updated = self
                    .store
                    .update_document(existing.id, &patch)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "Document",
                        id: existing.id,
                    })?;
                (SyncAction::Updated, updated)
            }
            None => {
                let new_doc = NewDocument {
                    title,
                    content,
                    path,
                    status: self.config.pulled_status,
                    author_id: actor,
                    last_editor_id: Some(actor),
                    github_path: Some(entry.path.clone()),
                    github_sha: Some(file.sha),
                    metadata: json!({}),
                };
                (SyncAction::Created, self.store.create_document(&new_doc).await?)
            }
        };

        tracing::debug!(
            document_id = document.id,
            path = %document.path,
            action = ?action,
            "Pulled document",
        );
        report.documents.push(SyncedDocument { action, document });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Push
    // -----------------------------------------------------------------------

    /// Submit an approved document as a branch and pull request on the
    /// first active repository.
    ///
    /// If anything fails after the branch exists, the branch is deleted
    /// again (best effort) and the original error is returned.
    pub async fn submit_to_github(
        &self,
        document_id: DbId,
        actor: DbId,
    ) -> Result<Submission, SyncError> {
        let document = self
            .store
            .find_document(document_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Document",
                id: document_id,
            })?;
        if document.status != DocumentStatus::Approved {
            return Err(CoreError::Precondition(format!(
                "Only approved documents can be submitted (current status: '{}')",
                document.status
            ))
            .into());
        }

        let repo = self
            .store
            .list_active_repos()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                CoreError::Precondition("No active GitHub repository is configured".to_string())
            })?;
        let coords = self.coordinates(&repo)?;

        let branch = submission_branch_name(&document.path, Utc::now().timestamp_millis());
        let base_sha = self.host.get_branch_tip(&coords, &repo.branch).await?;
        self.host.create_branch(&coords, &branch, &base_sha).await?;

        match self
            .publish(&coords, &repo, &document, &branch, actor)
            .await
        {
            Ok(submission) => {
                tracing::info!(
                    document_id,
                    repo_id = repo.id,
                    pr_number = submission.number,
                    branch = %branch,
                    "Document submitted",
                );
                Ok(submission)
            }
            Err(err) => {
                tracing::error!(document_id, branch = %branch, error = %err, "Push failed");
                if let Err(cleanup) = self.host.delete_branch(&coords, &branch).await {
                    tracing::warn!(
                        branch = %branch,
                        error = %cleanup,
                        "Failed to delete branch after push failure",
                    );
                }
                Err(err)
            }
        }
    }

    /// Everything after branch creation: write the file, open the pull
    /// request, record the link on the document.
    async fn publish(
        &self,
        coords: &RepoCoordinates,
        repo: &GithubRepo,
        document: &Document,
        branch: &str,
        actor: DbId,
    ) -> Result<Submission, SyncError> {
        let remote_path =
            remote_path_for_document(&document.path, document.github_path.as_deref());
        let existing_sha = self
            .host
            .get_file(coords, &remote_path, &repo.branch)
            .await?
            .map(|file| file.sha);

        let title = format!("Update documentation: {}", document.title);
        let written = self
            .host
            .put_file(
                coords,
                &FileWrite {
                    path: &remote_path,
                    branch,
                    message: &title,
                    content: document.content.as_bytes(),
                    sha: existing_sha.as_deref(),
                },
            )
            .await?;

        let body = format!(
            "Updates the documentation page \"{}\".\n\nPath: `{}`",
            document.title, document.path
        );
        let pr = self
            .host
            .create_pull_request(
                coords,
                &NewPullRequest {
                    title: &title,
                    body: &body,
                    head: branch,
                    base: &repo.branch,
                },
            )
            .await?;

        let patch = DocumentPatch {
            last_editor_id: Some(actor),
            github_path: Some(remote_path.clone()),
            github_sha: Some(written.sha.clone()),
            ..Default::default()
        };
        self.store
            .update_document(document.id, &patch)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Document",
                id: document.id,
            })?;

        Ok(Submission {
            number: pr.number,
            url: pr.html_url,
            branch: branch.to_string(),
            github_path: remote_path,
            github_sha: written.sha,
        })
    }
}
