//! The remote repository operations the sync engine needs.

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::GitHubApiError;

/// Which repository to talk to and with what credential.
#[derive(Clone)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
    /// Plaintext access token. Only lives for the duration of one sync.
    pub token: String,
}

impl std::fmt::Debug for RepoCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoCoordinates")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Kind of a directory entry as reported by the contents API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    /// Path from the repository root.
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// A file read from the repository, already decoded.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub path: String,
    /// Blob sha, needed to overwrite the file later.
    pub sha: String,
    pub bytes: Vec<u8>,
}

/// A create-or-update of one file on a branch.
#[derive(Debug, Clone)]
pub struct FileWrite<'a> {
    pub path: &'a str,
    pub branch: &'a str,
    pub message: &'a str,
    pub content: &'a [u8],
    /// Sha of the blob being replaced; `None` creates the file.
    pub sha: Option<&'a str>,
}

/// The blob a write produced.
#[derive(Debug, Clone, Deserialize)]
pub struct WrittenFile {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone)]
pub struct NewPullRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Remote repository transport.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// List the entries directly under `path` (empty for the root) at `git_ref`.
    async fn list_directory(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<ContentEntry>, GitHubApiError>;

    /// Read a file at `git_ref`. `None` if it does not exist.
    async fn get_file(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<RemoteFile>, GitHubApiError>;

    /// Sha of the commit at the tip of `branch`.
    async fn get_branch_tip(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
    ) -> Result<String, GitHubApiError>;

    async fn create_branch(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
        from_sha: &str,
    ) -> Result<(), GitHubApiError>;

    async fn delete_branch(&self, repo: &RepoCoordinates, branch: &str)
        -> Result<(), GitHubApiError>;

    async fn put_file(
        &self,
        repo: &RepoCoordinates,
        write: &FileWrite<'_>,
    ) -> Result<WrittenFile, GitHubApiError>;

    async fn create_pull_request(
        &self,
        repo: &RepoCoordinates,
        pr: &NewPullRequest<'_>,
    ) -> Result<PullRequest, GitHubApiError>;
}
