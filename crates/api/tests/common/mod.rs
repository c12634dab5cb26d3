//! Shared harness for the HTTP-level tests.
//!
//! The app is built through the production router on top of a
//! [`MemoryStore`] and an in-process [`RepoHost`], so no database or network
//! is needed.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wikidocs_api::auth::jwt::{generate_access_token, JwtConfig};
use wikidocs_api::config::{AdminSeed, ServerConfig};
use wikidocs_api::router::build_app_router;
use wikidocs_api::state::AppState;
use wikidocs_core::secrets::{TokenCipher, KEY_LEN};
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::DbId;
use wikidocs_db::models::user::CreateUser;
use wikidocs_db::{DocumentStore, MemoryStore};
use wikidocs_github::host::{
    ContentEntry, EntryKind, FileWrite, NewPullRequest, PullRequest, RemoteFile,
    RepoCoordinates, RepoHost, WrittenFile,
};
use wikidocs_github::{GitHubApiError, SyncConfig, SyncEngine};

/// Token the fake host accepts.
pub const GITHUB_TOKEN: &str = "ghp_api_test";

/// Placeholder hash for users that never log in through the API.
const UNUSABLE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$AAAA";

// ---------------------------------------------------------------------------
// Fake GitHub
// ---------------------------------------------------------------------------

#[derive(Default)]
struct HostState {
    /// Flat `path -> (sha, content)` view of the base branch.
    files: BTreeMap<String, (String, String)>,
    calls: Vec<&'static str>,
    fail_pull_requests: bool,
}

/// Single-branch repository kept in memory.
#[derive(Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn add_file(&self, path: &str, sha: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), (sha.to_string(), content.to_string()));
    }

    pub fn fail_pull_requests(&self) {
        self.state.lock().unwrap().fail_pull_requests = true;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, call: &'static str, repo: &RepoCoordinates) -> Result<(), GitHubApiError> {
        self.state.lock().unwrap().calls.push(call);
        if repo.token != GITHUB_TOKEN {
            return Err(GitHubApiError::ApiError {
                status: 401,
                body: "Bad credentials".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RepoHost for FakeHost {
    async fn list_directory(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        _git_ref: &str,
    ) -> Result<Vec<ContentEntry>, GitHubApiError> {
        self.enter("list_directory", repo)?;
        let state = self.state.lock().unwrap();
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let mut entries: Vec<ContentEntry> = Vec::new();
        for (file_path, (sha, _)) in &state.files {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            let entry = match rest.split_once('/') {
                Some((dir, _)) => ContentEntry {
                    name: dir.to_string(),
                    path: format!("{prefix}{dir}"),
                    sha: "tree".to_string(),
                    kind: EntryKind::Dir,
                },
                None => ContentEntry {
                    name: rest.to_string(),
                    path: file_path.clone(),
                    sha: sha.clone(),
                    kind: EntryKind::File,
                },
            };
            if !entries.iter().any(|e| e.path == entry.path) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn get_file(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        _git_ref: &str,
    ) -> Result<Option<RemoteFile>, GitHubApiError> {
        self.enter("get_file", repo)?;
        let state = self.state.lock().unwrap();
        Ok(state.files.get(path).map(|(sha, content)| RemoteFile {
            path: path.to_string(),
            sha: sha.clone(),
            bytes: content.as_bytes().to_vec(),
        }))
    }

    async fn get_branch_tip(
        &self,
        repo: &RepoCoordinates,
        _branch: &str,
    ) -> Result<String, GitHubApiError> {
        self.enter("get_branch_tip", repo)?;
        Ok("base-sha".to_string())
    }

    async fn create_branch(
        &self,
        repo: &RepoCoordinates,
        _branch: &str,
        _from_sha: &str,
    ) -> Result<(), GitHubApiError> {
        self.enter("create_branch", repo)
    }

    async fn delete_branch(
        &self,
        repo: &RepoCoordinates,
        _branch: &str,
    ) -> Result<(), GitHubApiError> {
        self.enter("delete_branch", repo)
    }

    async fn put_file(
        &self,
        repo: &RepoCoordinates,
        write: &FileWrite<'_>,
    ) -> Result<WrittenFile, GitHubApiError> {
        self.enter("put_file", repo)?;
        Ok(WrittenFile {
            path: write.path.to_string(),
            sha: "written-sha".to_string(),
        })
    }

    async fn create_pull_request(
        &self,
        repo: &RepoCoordinates,
        _pr: &NewPullRequest<'_>,
    ) -> Result<PullRequest, GitHubApiError> {
        self.enter("create_pull_request", repo)?;
        if self.state.lock().unwrap().fail_pull_requests {
            return Err(GitHubApiError::ApiError {
                status: 422,
                body: "Validation Failed".to_string(),
            });
        }
        Ok(PullRequest {
            number: 12,
            html_url: format!("https://github.com/{}/{}/pull/12", repo.owner, repo.name),
        })
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        jwt: JwtConfig {
            secret: "api-test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 60,
        },
        github_api_url: "http://127.0.0.1:9".to_string(),
        github_timeout_secs: 5,
        sync_default_status: DocumentStatus::Draft,
        token_encryption_key: String::new(),
        admin: AdminSeed {
            username: "admin".to_string(),
            email: "admin@wikidocs.local".to_string(),
            password: None,
        },
    }
}

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub host: Arc<FakeHost>,
    pub config: ServerConfig,
}

pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let host = Arc::new(FakeHost::default());
    let cipher = TokenCipher::new(&[9u8; KEY_LEN]);
    let sync = SyncEngine::new(
        store.clone(),
        host.clone(),
        cipher.clone(),
        SyncConfig::default(),
    );

    let state = AppState {
        store: store.clone(),
        sync: Arc::new(sync),
        cipher,
        config: Arc::new(config.clone()),
    };
    TestApp {
        app: build_app_router(state, &config),
        store,
        host,
        config,
    }
}

impl TestApp {
    /// Insert a user directly and return its id and an access token.
    pub async fn user(&self, username: &str, role: &str) -> (DbId, String) {
        let user = self
            .store
            .create_user(&CreateUser {
                username: username.to_string(),
                email: format!("{username}@test.com"),
                password_hash: UNUSABLE_HASH.to_string(),
                role: role.to_string(),
            })
            .await
            .unwrap();
        let token = generate_access_token(user.id, role, &self.config.jwt).unwrap();
        (user.id, token)
    }

    pub async fn editor(&self) -> (DbId, String) {
        self.user("editor", "editor").await
    }

    pub async fn reviewer(&self) -> (DbId, String) {
        self.user("reviewer", "reviewer").await
    }

    pub async fn admin(&self) -> (DbId, String) {
        self.user("admin", "admin").await
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: &Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Read the full response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
