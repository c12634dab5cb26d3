//! In-process stand-in for GitHub plus helpers to wire a sync engine to it.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wikidocs_core::secrets::{TokenCipher, KEY_LEN};
use wikidocs_db::models::github_repo::NewGithubRepo;
use wikidocs_db::{DocumentStore, MemoryStore};
use wikidocs_github::host::{
    ContentEntry, EntryKind, FileWrite, NewPullRequest, PullRequest, RemoteFile,
    RepoCoordinates, RepoHost, WrittenFile,
};
use wikidocs_github::{GitHubApiError, SyncConfig, SyncEngine};

pub const TOKEN: &str = "ghp_test_token";

/// A file committed to the fake repository's base branch.
#[derive(Debug, Clone)]
pub struct FakeFile {
    pub sha: String,
    pub bytes: Vec<u8>,
}

/// Record of a `put_file` call.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub path: String,
    pub branch: String,
    pub content: String,
    pub sha: Option<String>,
}

#[derive(Default)]
struct FakeState {
    files: BTreeMap<String, FakeFile>,
    branches: BTreeSet<String>,
    writes: Vec<RecordedWrite>,
    pulls: Vec<(String, String, String)>,
    calls: Vec<String>,
    fail_on: BTreeSet<&'static str>,
    unreadable: BTreeSet<String>,
    next_blob: u32,
}

/// Fake repository host.
///
/// Files live on a single base branch; writes are recorded rather than
/// applied. `fail_on("put_file")` makes that operation return a 500
/// from then on.
#[derive(Default)]
pub struct FakeHost {
    state: Mutex<FakeState>,
}

impl FakeHost {
    pub fn new() -> Self {
        let host = Self::default();
        host.state.lock().unwrap().branches.insert("main".to_string());
        host
    }

    pub fn add_file(&self, path: &str, sha: &str, content: &[u8]) {
        self.state.lock().unwrap().files.insert(
            path.to_string(),
            FakeFile {
                sha: sha.to_string(),
                bytes: content.to_vec(),
            },
        );
    }

    /// Serve `path` like GitHub serves a file over 1 MB: listed, but
    /// without content.
    pub fn add_oversized_file(&self, path: &str, sha: &str) {
        self.add_file(path, sha, b"");
        self.state.lock().unwrap().unreadable.insert(path.to_string());
    }

    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().fail_on.insert(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn branches(&self) -> Vec<String> {
        self.state.lock().unwrap().branches.iter().cloned().collect()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state.lock().unwrap().writes.clone()
    }

    /// `(title, head, base)` of every pull request opened.
    pub fn pulls(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().pulls.clone()
    }

    fn enter(
        &self,
        operation: &'static str,
        repo: &RepoCoordinates,
    ) -> Result<(), GitHubApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation.to_string());
        if repo.token != TOKEN {
            return Err(GitHubApiError::ApiError {
                status: 401,
                body: "Bad credentials".to_string(),
            });
        }
        if state.fail_on.contains(&operation) {
            return Err(GitHubApiError::ApiError {
                status: 500,
                body: format!("{operation} failed"),
            });
        }
        Ok(())
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
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

        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for (file_path, file) in &state.files {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(format!("{prefix}{dir}"));
                }
                None => entries.push(ContentEntry {
                    name: rest.to_string(),
                    path: file_path.clone(),
                    sha: file.sha.clone(),
                    kind: EntryKind::File,
                }),
            }
        }
        for dir in dirs {
            entries.push(ContentEntry {
                name: file_name(&dir).to_string(),
                path: dir,
                sha: "tree".to_string(),
                kind: EntryKind::Dir,
            });
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
        if state.unreadable.contains(path) {
            return Err(GitHubApiError::ContentUnavailable(path.to_string()));
        }
        Ok(state.files.get(path).map(|f| RemoteFile {
            path: path.to_string(),
            sha: f.sha.clone(),
            bytes: f.bytes.clone(),
        }))
    }

    async fn get_branch_tip(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
    ) -> Result<String, GitHubApiError> {
        self.enter("get_branch_tip", repo)?;
        Ok(format!("tip-of-{branch}"))
    }

    async fn create_branch(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
        _from_sha: &str,
    ) -> Result<(), GitHubApiError> {
        self.enter("create_branch", repo)?;
        self.state.lock().unwrap().branches.insert(branch.to_string());
        Ok(())
    }

    async fn delete_branch(
        &self,
        repo: &RepoCoordinates,
        branch: &str,
    ) -> Result<(), GitHubApiError> {
        self.enter("delete_branch", repo)?;
        self.state.lock().unwrap().branches.remove(branch);
        Ok(())
    }

    async fn put_file(
        &self,
        repo: &RepoCoordinates,
        write: &FileWrite<'_>,
    ) -> Result<WrittenFile, GitHubApiError> {
        self.enter("put_file", repo)?;
        let mut state = self.state.lock().unwrap();
        state.next_blob += 1;
        let sha = format!("blob-{}", state.next_blob);
        state.writes.push(RecordedWrite {
            path: write.path.to_string(),
            branch: write.branch.to_string(),
            content: String::from_utf8_lossy(write.content).into_owned(),
            sha: write.sha.map(str::to_string),
        });
        Ok(WrittenFile {
            path: write.path.to_string(),
            sha,
        })
    }

    async fn create_pull_request(
        &self,
        repo: &RepoCoordinates,
        pr: &NewPullRequest<'_>,
    ) -> Result<PullRequest, GitHubApiError> {
        self.enter("create_pull_request", repo)?;
        let mut state = self.state.lock().unwrap();
        state
            .pulls
            .push((pr.title.to_string(), pr.head.to_string(), pr.base.to_string()));
        let number = state.pulls.len() as u64;
        Ok(PullRequest {
            number,
            html_url: format!(
                "https://github.com/{}/{}/pull/{number}",
                repo.owner, repo.name
            ),
        })
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub host: Arc<FakeHost>,
    pub engine: SyncEngine,
    pub cipher: TokenCipher,
}

pub fn harness() -> Harness {
    harness_with(SyncConfig::default())
}

pub fn harness_with(config: SyncConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let host = Arc::new(FakeHost::new());
    let cipher = TokenCipher::new(&[3u8; KEY_LEN]);
    let engine = SyncEngine::new(store.clone(), host.clone(), cipher.clone(), config);
    Harness {
        store,
        host,
        engine,
        cipher,
    }
}

impl Harness {
    /// Link a repository whose sealed token the fake host accepts.
    pub async fn link_repo(&self, active: bool) -> i64 {
        let input = NewGithubRepo {
            owner: "acme".to_string(),
            name: "handbook".to_string(),
            branch: "main".to_string(),
            token_ciphertext: self.cipher.seal(TOKEN).unwrap(),
            is_active: active,
        };
        self.store.create_repo(&input).await.unwrap().id
    }
}
