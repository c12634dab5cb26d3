//! Behaviour of the in-memory store that the rest of the system relies on.

use assert_matches::assert_matches;
use serde_json::json;
use wikidocs_core::status::{DocumentStatus, ReviewDecision};
use wikidocs_db::models::document::{DocumentPatch, NewDocument};
use wikidocs_db::models::github_repo::{GithubRepoPatch, NewGithubRepo};
use wikidocs_db::models::review::NewReview;
use wikidocs_db::models::user::CreateUser;
use wikidocs_db::{DocumentStore, MemoryStore, StoreError};

fn new_doc(path: &str, title: &str, content: &str) -> NewDocument {
    NewDocument {
        title: title.to_string(),
        content: content.to_string(),
        path: path.to_string(),
        status: DocumentStatus::Draft,
        author_id: 1,
        last_editor_id: Some(1),
        github_path: None,
        github_sha: None,
        metadata: json!({}),
    }
}

fn new_repo(owner: &str, active: bool) -> NewGithubRepo {
    NewGithubRepo {
        owner: owner.to_string(),
        name: "docs".to_string(),
        branch: "main".to_string(),
        token_ciphertext: "sealed".to_string(),
        is_active: active,
    }
}

#[tokio::test]
async fn duplicate_document_path_is_a_conflict() {
    let store = MemoryStore::new();
    store
        .create_document(&new_doc("api/auth", "Auth", ""))
        .await
        .unwrap();

    let err = store
        .create_document(&new_doc("api/auth", "Other", ""))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Conflict(_));
}

#[tokio::test]
async fn renaming_onto_a_taken_path_is_a_conflict() {
    let store = MemoryStore::new();
    store.create_document(&new_doc("a", "A", "")).await.unwrap();
    let b = store.create_document(&new_doc("b", "B", "")).await.unwrap();

    let patch = DocumentPatch {
        path: Some("a".to_string()),
        ..Default::default()
    };
    assert_matches!(
        store.update_document(b.id, &patch).await,
        Err(StoreError::Conflict(_))
    );

    // Re-saving a document's own path is fine.
    let patch = DocumentPatch {
        path: Some("b".to_string()),
        ..Default::default()
    };
    assert!(store.update_document(b.id, &patch).await.unwrap().is_some());
}

#[tokio::test]
async fn updated_at_never_decreases() {
    let store = MemoryStore::new();
    let doc = store.create_document(&new_doc("a", "A", "")).await.unwrap();

    let mut previous = doc.updated_at;
    for i in 0..5 {
        let patch = DocumentPatch {
            content: Some(format!("v{i}")),
            ..Default::default()
        };
        let updated = store.update_document(doc.id, &patch).await.unwrap().unwrap();
        assert!(updated.updated_at >= previous);
        previous = updated.updated_at;
    }
}

#[tokio::test]
async fn patch_leaves_unset_fields_alone() {
    let store = MemoryStore::new();
    let doc = store
        .create_document(&new_doc("guides/start", "Start", "# Start"))
        .await
        .unwrap();

    let patch = DocumentPatch {
        github_sha: Some("abc123".to_string()),
        ..Default::default()
    };
    let updated = store.update_document(doc.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.title, "Start");
    assert_eq!(updated.content, "# Start");
    assert_eq!(updated.github_sha.as_deref(), Some("abc123"));
    assert!(updated.github_path.is_none());
}

#[tokio::test]
async fn update_and_delete_of_missing_document() {
    let store = MemoryStore::new();
    let patch = DocumentPatch::default();
    assert!(store.update_document(42, &patch).await.unwrap().is_none());
    assert!(!store.delete_document(42).await.unwrap());
}

#[tokio::test]
async fn search_is_case_insensitive_over_title_content_and_path() {
    let store = MemoryStore::new();
    let by_title = store
        .create_document(&new_doc("a", "OAuth Flow", ""))
        .await
        .unwrap();
    let by_content = store
        .create_document(&new_doc("b", "Tokens", "Use AUTH headers"))
        .await
        .unwrap();
    let by_path = store
        .create_document(&new_doc("api/auth", "Login", ""))
        .await
        .unwrap();
    store
        .create_document(&new_doc("c", "Unrelated", "nothing here"))
        .await
        .unwrap();

    let mut ids: Vec<_> = store
        .search_documents("auth")
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![by_title.id, by_content.id, by_path.id]);
}

#[tokio::test]
async fn list_filters_by_status_and_author() {
    let store = MemoryStore::new();
    store.create_document(&new_doc("a", "A", "")).await.unwrap();
    let mut pending = new_doc("b", "B", "x");
    pending.status = DocumentStatus::PendingReview;
    pending.author_id = 7;
    store.create_document(&pending).await.unwrap();

    let drafts = store
        .list_documents_by_status(DocumentStatus::Draft)
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].path, "a");

    let by_author = store.list_documents_by_author(7).await.unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].path, "b");
}

#[tokio::test]
async fn record_review_moves_document_and_appends_review() {
    let store = MemoryStore::new();
    let mut doc = new_doc("a", "A", "body");
    doc.status = DocumentStatus::PendingReview;
    let doc = store.create_document(&doc).await.unwrap();

    let input = NewReview {
        document_id: doc.id,
        reviewer_id: 9,
        status: ReviewDecision::NeedsRevision,
        comments: Some("Expand the intro".to_string()),
        changes: json!(["intro"]),
    };
    let recorded = store
        .record_review(&input, DocumentStatus::PendingReview)
        .await
        .unwrap()
        .expect("document was pending");

    assert_eq!(recorded.document.status, DocumentStatus::NeedsRevision);
    assert_eq!(recorded.document.reviewer_id, Some(9));
    assert_eq!(
        recorded.document.review_comments.as_deref(),
        Some("Expand the intro")
    );
    assert_eq!(recorded.review.status, ReviewDecision::NeedsRevision);

    // A second review expecting the old status writes nothing.
    assert!(store
        .record_review(&input, DocumentStatus::PendingReview)
        .await
        .unwrap()
        .is_none());
    assert_eq!(store.list_reviews_for_document(doc.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reviews_are_listed_newest_first_and_survive_deletion() {
    let store = MemoryStore::new();
    let mut doc = new_doc("a", "A", "body");
    doc.status = DocumentStatus::PendingReview;
    let doc = store.create_document(&doc).await.unwrap();

    for decision in [ReviewDecision::NeedsRevision, ReviewDecision::Approved] {
        let input = NewReview {
            document_id: doc.id,
            reviewer_id: 2,
            status: decision,
            comments: None,
            changes: json!([]),
        };
        store
            .record_review(&input, DocumentStatus::PendingReview)
            .await
            .unwrap();
        let back = DocumentPatch {
            status: Some(DocumentStatus::PendingReview),
            ..Default::default()
        };
        store.update_document(doc.id, &back).await.unwrap();
    }

    assert!(store.delete_document(doc.id).await.unwrap());
    let reviews = store.list_reviews_for_document(doc.id).await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].status, ReviewDecision::Approved);
    assert_eq!(reviews[1].status, ReviewDecision::NeedsRevision);
}

#[tokio::test]
async fn active_repos_are_listed_lowest_id_first() {
    let store = MemoryStore::new();
    let first = store.create_repo(&new_repo("one", true)).await.unwrap();
    let inactive = store.create_repo(&new_repo("two", false)).await.unwrap();
    let third = store.create_repo(&new_repo("three", true)).await.unwrap();

    let active: Vec<_> = store
        .list_active_repos()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(active, vec![first.id, third.id]);
    assert_eq!(store.list_repos().await.unwrap().len(), 3);

    let patch = GithubRepoPatch {
        is_active: Some(true),
        ..Default::default()
    };
    let reactivated = store.update_repo(inactive.id, &patch).await.unwrap().unwrap();
    assert!(reactivated.is_active);
    assert_eq!(reactivated.token_ciphertext, "sealed");
}

#[tokio::test]
async fn usernames_are_unique() {
    let store = MemoryStore::new();
    let input = CreateUser {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: "hash".to_string(),
        role: "editor".to_string(),
    };
    let user = store.create_user(&input).await.unwrap();
    assert_eq!(
        store.find_user_by_username("ada").await.unwrap().unwrap().id,
        user.id
    );

    let dup = CreateUser {
        email: "other@example.com".to_string(),
        ..input
    };
    assert_matches!(store.create_user(&dup).await, Err(StoreError::Conflict(_)));
}
