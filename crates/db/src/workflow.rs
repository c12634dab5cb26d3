//! Document authoring and the review state machine.
//!
//! Every operation takes the acting user's id explicitly. Rules about which
//! status changes are legal live in `wikidocs_core::status`; this module
//! applies them against a [`DocumentStore`].

use serde_json::json;
use validator::Validate;
use wikidocs_core::error::CoreError;
use wikidocs_core::folder_tree::{build_folder_tree, FolderTree};
use wikidocs_core::naming::{folder_of, validate_path, validate_title};
use wikidocs_core::status::{
    validate_author_transition, validate_review_transition, DocumentStatus,
};
use wikidocs_core::types::DbId;

use crate::models::document::{
    CreateDocument, Document, DocumentPatch, NewDocument, UpdateDocument,
};
use crate::models::folder::{CreateFolder, Folder};
use crate::models::review::{NewReview, RecordedReview, Review, SubmitReview};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

fn check<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

fn document_not_found(id: DbId) -> WorkflowError {
    CoreError::NotFound {
        entity: "Document",
        id,
    }
    .into()
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub async fn get_document(store: &dyn DocumentStore, id: DbId) -> WorkflowResult<Document> {
    store
        .find_document(id)
        .await?
        .ok_or_else(|| document_not_found(id))
}

/// Create a draft authored by `actor`.
pub async fn create_document(
    store: &dyn DocumentStore,
    actor: DbId,
    input: &CreateDocument,
) -> WorkflowResult<Document> {
    check(input)?;
    validate_title(&input.title)?;
    validate_path(&input.path)?;

    let new_doc = NewDocument {
        title: input.title.clone(),
        content: input.content.clone(),
        path: input.path.clone(),
        status: DocumentStatus::Draft,
        author_id: actor,
        last_editor_id: Some(actor),
        github_path: None,
        github_sha: None,
        metadata: input.metadata.clone().unwrap_or_else(|| json!({})),
    };
    let document = store.create_document(&new_doc).await?;

    tracing::info!(
        document_id = document.id,
        path = %document.path,
        user_id = actor,
        "Document created",
    );
    Ok(document)
}

/// Apply an author edit.
///
/// A status change must be an author edge of the transition table; review
/// outcomes can only be reached through [`submit_review`].
pub async fn update_document(
    store: &dyn DocumentStore,
    actor: DbId,
    id: DbId,
    input: &UpdateDocument,
) -> WorkflowResult<Document> {
    check(input)?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(path) = &input.path {
        validate_path(path)?;
    }

    let existing = get_document(store, id).await?;
    if let Some(target) = input.status {
        let content = input.content.as_deref().unwrap_or(&existing.content);
        validate_author_transition(existing.status, target, content)?;
    }

    let patch = DocumentPatch {
        title: input.title.clone(),
        content: input.content.clone(),
        path: input.path.clone(),
        status: input.status,
        last_editor_id: Some(actor),
        metadata: input.metadata.clone(),
        ..Default::default()
    };
    let document = store
        .update_document(id, &patch)
        .await?
        .ok_or_else(|| document_not_found(id))?;

    if existing.status != document.status {
        tracing::info!(
            document_id = id,
            from = %existing.status,
            to = %document.status,
            user_id = actor,
            "Document status changed",
        );
    }
    Ok(document)
}

pub async fn delete_document(
    store: &dyn DocumentStore,
    actor: DbId,
    id: DbId,
) -> WorkflowResult<()> {
    if !store.delete_document(id).await? {
        return Err(document_not_found(id));
    }
    tracing::info!(document_id = id, user_id = actor, "Document deleted");
    Ok(())
}

/// Search documents. A blank query is refused rather than matching everything.
pub async fn search_documents(
    store: &dyn DocumentStore,
    query: &str,
) -> WorkflowResult<Vec<Document>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CoreError::Validation("Search query must not be empty".to_string()).into());
    }
    Ok(store.search_documents(query).await?)
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Record a review decision by `actor` against a pending document.
pub async fn submit_review(
    store: &dyn DocumentStore,
    actor: DbId,
    input: &SubmitReview,
) -> WorkflowResult<RecordedReview> {
    let changes = match &input.changes {
        None => json!([]),
        Some(value) if value.is_array() => value.clone(),
        Some(_) => {
            return Err(
                CoreError::Validation("Review changes must be a JSON array".to_string()).into(),
            )
        }
    };

    let document = get_document(store, input.document_id).await?;
    validate_review_transition(document.status)?;

    let new_review = NewReview {
        document_id: document.id,
        reviewer_id: actor,
        status: input.status,
        comments: input.comments.clone(),
        changes,
    };
    let recorded = store
        .record_review(&new_review, DocumentStatus::PendingReview)
        .await?
        .ok_or_else(|| {
            CoreError::Precondition(format!(
                "Document {} is no longer pending review",
                document.id
            ))
        })?;

    tracing::info!(
        document_id = document.id,
        review_id = recorded.review.id,
        decision = %input.status,
        user_id = actor,
        "Review recorded",
    );
    Ok(recorded)
}

/// Reviews for a document, newest first.
///
/// Reviews outlive their document, so a missing document is not an error.
pub async fn list_reviews(
    store: &dyn DocumentStore,
    document_id: DbId,
) -> WorkflowResult<Vec<Review>> {
    Ok(store.list_reviews_for_document(document_id).await?)
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

/// Create a folder. A missing parent path is inferred from the folder path.
pub async fn create_folder(
    store: &dyn DocumentStore,
    input: &CreateFolder,
) -> WorkflowResult<Folder> {
    check(input)?;
    validate_path(&input.path)?;

    let parent_path = match input.parent_path.as_deref() {
        Some("") => None,
        Some(parent) => {
            validate_path(parent)?;
            Some(parent.to_string())
        }
        None => folder_of(&input.path).map(str::to_string),
    };
    let normalized = CreateFolder {
        parent_path,
        ..input.clone()
    };
    Ok(store.create_folder(&normalized).await?)
}

/// Assemble every folder and document into a tree.
pub async fn folder_tree(
    store: &dyn DocumentStore,
) -> WorkflowResult<FolderTree<Folder, Document>> {
    let folders = store.list_folders().await?;
    let mut documents = store.list_documents().await?;
    documents.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(build_folder_tree(folders, documents))
}
