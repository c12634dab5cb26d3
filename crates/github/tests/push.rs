//! Submitting approved documents as pull requests.

mod common;

use assert_matches::assert_matches;
use common::{harness, Harness};
use serde_json::json;
use wikidocs_core::error::CoreError;
use wikidocs_core::status::{DocumentStatus, SyncState};
use wikidocs_db::models::document::{DocumentPatch, NewDocument};
use wikidocs_db::DocumentStore;
use wikidocs_github::SyncError;

const ACTOR: i64 = 3;

async fn document(h: &Harness, path: &str, status: DocumentStatus) -> i64 {
    let input = NewDocument {
        title: "Auth".to_string(),
        content: "# Auth\n\nUse tokens.".to_string(),
        path: path.to_string(),
        status,
        author_id: 1,
        last_editor_id: None,
        github_path: None,
        github_sha: None,
        metadata: json!({}),
    };
    h.store.create_document(&input).await.unwrap().id
}

#[tokio::test]
async fn approved_document_becomes_pull_request() {
    let h = harness();
    h.link_repo(true).await;
    let id = document(&h, "api/auth", DocumentStatus::Approved).await;

    let submission = h.engine.submit_to_github(id, ACTOR).await.unwrap();
    assert_eq!(submission.number, 1);
    assert_eq!(submission.github_path, "api/auth.md");
    assert!(submission.branch.starts_with("docs-update-api-auth-"));
    assert!(submission.url.ends_with("/pull/1"));

    let writes = h.host.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].path, "api/auth.md");
    assert_eq!(writes[0].branch, submission.branch);
    assert_eq!(writes[0].content, "# Auth\n\nUse tokens.");
    assert!(writes[0].sha.is_none());

    let pulls = h.host.pulls();
    assert_eq!(pulls[0].0, "Update documentation: Auth");
    assert_eq!(pulls[0].1, submission.branch);
    assert_eq!(pulls[0].2, "main");

    let doc = h.store.find_document(id).await.unwrap().unwrap();
    assert_eq!(doc.github_path.as_deref(), Some("api/auth.md"));
    assert_eq!(doc.github_sha.as_deref(), Some(submission.github_sha.as_str()));
    assert_eq!(doc.last_editor_id, Some(ACTOR));
    assert_eq!(doc.sync_state(), SyncState::Synced);
}

#[tokio::test]
async fn existing_remote_file_is_updated_with_its_sha() {
    let h = harness();
    h.link_repo(true).await;
    h.host.add_file("docs/AUTH.md", "remote-sha", b"old");
    let id = document(&h, "api/auth", DocumentStatus::Approved).await;
    let link = DocumentPatch {
        github_path: Some("docs/AUTH.md".to_string()),
        ..Default::default()
    };
    h.store.update_document(id, &link).await.unwrap();

    let submission = h.engine.submit_to_github(id, ACTOR).await.unwrap();
    assert_eq!(submission.github_path, "docs/AUTH.md");
    let writes = h.host.writes();
    assert_eq!(writes[0].sha.as_deref(), Some("remote-sha"));
}

#[tokio::test]
async fn unapproved_document_makes_no_remote_calls() {
    let h = harness();
    h.link_repo(true).await;
    for status in [
        DocumentStatus::Draft,
        DocumentStatus::PendingReview,
        DocumentStatus::NeedsRevision,
        DocumentStatus::Rejected,
    ] {
        let id = document(&h, &format!("doc-{status}"), status).await;
        let err = h.engine.submit_to_github(id, ACTOR).await.unwrap_err();
        assert_matches!(err, SyncError::Core(CoreError::Precondition(_)));
    }
    assert!(h.host.calls().is_empty());
}

#[tokio::test]
async fn missing_document_is_not_found() {
    let h = harness();
    h.link_repo(true).await;
    let err = h.engine.submit_to_github(77, ACTOR).await.unwrap_err();
    assert_matches!(err, SyncError::Core(CoreError::NotFound { id: 77, .. }));
}

#[tokio::test]
async fn no_active_repo_is_a_precondition_failure() {
    let h = harness();
    h.link_repo(false).await;
    let id = document(&h, "api/auth", DocumentStatus::Approved).await;

    let err = h.engine.submit_to_github(id, ACTOR).await.unwrap_err();
    assert_matches!(err, SyncError::Core(CoreError::Precondition(_)));
    assert!(h.host.calls().is_empty());
}

#[tokio::test]
async fn failure_after_branch_creation_deletes_the_branch() {
    let h = harness();
    h.link_repo(true).await;
    let id = document(&h, "api/auth", DocumentStatus::Approved).await;
    h.host.fail_on("create_pull_request");

    let err = h.engine.submit_to_github(id, ACTOR).await.unwrap_err();
    assert_matches!(err, SyncError::Remote(_));
    assert!(h.host.calls().contains(&"delete_branch".to_string()));
    assert_eq!(h.host.branches(), vec!["main".to_string()]);

    let doc = h.store.find_document(id).await.unwrap().unwrap();
    assert!(doc.github_sha.is_none());
    assert_eq!(doc.sync_state(), SyncState::Unlinked);
}

#[tokio::test]
async fn failed_branch_cleanup_still_returns_original_error() {
    let h = harness();
    h.link_repo(true).await;
    let id = document(&h, "api/auth", DocumentStatus::Approved).await;
    h.host.fail_on("put_file");
    h.host.fail_on("delete_branch");

    let err = h.engine.submit_to_github(id, ACTOR).await.unwrap_err();
    match err {
        SyncError::Remote(remote) => assert!(remote.to_string().contains("put_file failed")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.host.branches().len(), 2);
}

#[tokio::test]
async fn push_uses_lowest_id_active_repo() {
    let h = harness();
    h.link_repo(false).await;
    h.link_repo(true).await;
    h.link_repo(true).await;
    let id = document(&h, "guides/start", DocumentStatus::Approved).await;

    let submission = h.engine.submit_to_github(id, ACTOR).await.unwrap();
    assert_eq!(submission.number, 1);
    assert!(submission.branch.starts_with("docs-update-guides-start-"));
}
