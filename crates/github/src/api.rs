//! REST client for the GitHub v3 API.
//!
//! Covers the contents, git refs and pulls endpoints used by the sync engine.
//! Every request carries the repository's bearer token and pins the API
//! version.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::host::{
    ContentEntry, FileWrite, NewPullRequest, PullRequest, RemoteFile, RepoCoordinates, RepoHost,
    WrittenFile,
};

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("wikidocs/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the GitHub REST API.
#[derive(Clone)]
pub struct GitHubApi {
    client: reqwest::Client,
    base_url: Url,
}

/// Errors from the GitHub REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GitHubApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// GitHub returned a non-2xx status code.
    #[error("GitHub API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A response parsed but its content did not have the expected shape.
    #[error("Unexpected GitHub response: {0}")]
    Decode(String),

    /// The contents API did not inline the file body. GitHub does this
    /// for files over 1 MB and answers with encoding `none`.
    #[error("Content of '{0}' is not available through the contents API")]
    ContentUnavailable(String),

    #[error("Invalid GitHub API URL: {0}")]
    InvalidUrl(String),
}

/// File body as returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Deserialize)]
struct FileContent {
    path: String,
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PutFileResponse {
    content: WrittenFile,
}

impl GitHubApi {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `https://api.github.com`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GitHubApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Self::with_client(client, base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, GitHubApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GitHubApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GitHubApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    // ---- private helpers ----

    /// Build `<base>/repos/{owner}/{name}/<segments...>`, percent-encoding
    /// every segment. Segments containing `/` are split so file paths keep
    /// their directory structure.
    fn repo_url(&self, repo: &RepoCoordinates, segments: &[&str]) -> Result<Url, GitHubApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GitHubApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str()]);
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        repo: &RepoCoordinates,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&repo.token)
            .header(ACCEPT, MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GitHubApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GitHubApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GitHubApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GitHubApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Decode a contents-API base64 body. GitHub wraps it at 60 columns.
fn decode_content(file: &FileContent) -> Result<Vec<u8>, GitHubApiError> {
    if file.encoding == "none" {
        return Err(GitHubApiError::ContentUnavailable(file.path.clone()));
    }
    if !file.encoding.is_empty() && file.encoding != "base64" {
        return Err(GitHubApiError::Decode(format!(
            "{} has unsupported encoding '{}'",
            file.path, file.encoding
        )));
    }
    let compact: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| GitHubApiError::Decode(format!("{} is not valid base64: {e}", file.path)))
}

#[async_trait]
impl RepoHost for GitHubApi {
    async fn list_directory(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<ContentEntry>, GitHubApiError> {
        let url = self.repo_url(repo, &["contents", path])?;
        let response = self
            .request(reqwest::Method::GET, url, repo)
            .query(&[("ref", git_ref)])
            .send()
            .await?;

        let body: serde_json::Value = Self::parse_response(response).await?;
        if !body.is_array() {
            return Err(GitHubApiError::Decode(format!("'{path}' is not a directory")));
        }
        serde_json::from_value(body).map_err(|e| GitHubApiError::Decode(e.to_string()))
    }

    async fn get_file(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<RemoteFile>, GitHubApiError> {
        let url = self.repo_url(repo, &["contents", path])?;
        let response = self
            .request(reqwest::Method::GET, url, repo)
            .query(&[("ref", git_ref)])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: serde_json::Value = Self::parse_response(response).await?;
        if body.is_array() {
            return Err(GitHubApiError::Decode(format!("'{path}' is a directory")));
        }
        let file: FileContent =
            serde_json::from_value(body).map_err(|e| GitHubApiError::Decode(e.to_string()))?;
        let bytes = decode_content(&file)?;
        Ok(Some(RemoteFile {
            path: file.path,
            sha: file.sha,
            bytes,
        }))
    }

    async fn get_branch_tip(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
    ) -> Result<String, GitHubApiError> {
        let url = self.repo_url(repo, &["git", "ref", "heads", branch])?;
        let response = self.request(reqwest::Method::GET, url, repo).send().await?;
        let git_ref: GitRef = Self::parse_response(response).await?;
        Ok(git_ref.object.sha)
    }

    async fn create_branch(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
        from_sha: &str,
    ) -> Result<(), GitHubApiError> {
        let url = self.repo_url(repo, &["git", "refs"])?;
        let body = serde_json::json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": from_sha,
        });
        let response = self
            .request(reqwest::Method::POST, url, repo)
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn delete_branch(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
    ) -> Result<(), GitHubApiError> {
        let url = self.repo_url(repo, &["git", "refs", "heads", branch])?;
        let response = self
            .request(reqwest::Method::DELETE, url, repo)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn put_file(
        &self,
        repo: &RepoCoordinates,
        write: &FileWrite<'_>,
    ) -> Result<WrittenFile, GitHubApiError> {
        let url = self.repo_url(repo, &["contents", write.path])?;
        let mut body = serde_json::json!({
            "message": write.message,
            "content": STANDARD.encode(write.content),
            "branch": write.branch,
        });
        if let Some(sha) = write.sha {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }
        let response = self
            .request(reqwest::Method::PUT, url, repo)
            .json(&body)
            .send()
            .await?;
        let written: PutFileResponse = Self::parse_response(response).await?;
        Ok(written.content)
    }

    async fn create_pull_request(
        &self,
        repo: &RepoCoordinates,
        pr: &NewPullRequest<'_>,
    ) -> Result<PullRequest, GitHubApiError> {
        let url = self.repo_url(repo, &["pulls"])?;
        let body = serde_json::json!({
            "title": pr.title,
            "body": pr.body,
            "head": pr.head,
            "base": pr.base,
        });
        let response = self
            .request(reqwest::Method::POST, url, repo)
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
