//! GitHub synchronization for wikidocs.
//!
//! [`RepoHost`] is the transport seam: [`GitHubApi`] talks to the GitHub REST
//! API, tests substitute an in-process fake. [`SyncEngine`] drives the pull
//! (import markdown files) and push (branch + pull request) flows on top of
//! it and the document store.

pub mod api;
pub mod engine;
pub mod host;

pub use api::{GitHubApi, GitHubApiError};
pub use engine::{
    Submission, SyncAction, SyncConfig, SyncEngine, SyncError, SyncReport, SyncedDocument,
};
pub use host::RepoHost;
