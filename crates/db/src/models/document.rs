//! Document entity model and DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use validator::Validate;
use wikidocs_core::folder_tree::TreeDocument;
use wikidocs_core::status::{DocumentStatus, SyncState};
use wikidocs_core::types::{DbId, Timestamp};

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub title: String,
    /// Raw markdown.
    pub content: String,
    /// Logical location, `folder/subfolder/name`.
    pub path: String,
    #[sqlx(try_from = "String")]
    pub status: DocumentStatus,
    pub author_id: DbId,
    pub last_editor_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    pub review_comments: Option<String>,
    pub github_path: Option<String>,
    /// Remote blob sha, set only after a successful remote read or write.
    pub github_sha: Option<String>,
    pub metadata: JsonValue,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    pub fn sync_state(&self) -> SyncState {
        SyncState::derive(self.github_path.as_deref(), self.github_sha.as_deref())
    }
}

impl TreeDocument for Document {
    fn path(&self) -> &str {
        &self.path
    }
}

/// A document together with its derived sync state, for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: Document,
    pub sync_state: SyncState,
}

impl From<Document> for DocumentView {
    fn from(document: Document) -> Self {
        let sync_state = document.sync_state();
        Self {
            document,
            sync_state,
        }
    }
}

/// DTO for creating a new document. Documents always start as drafts.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocument {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub path: String,
    #[validate(custom(function = "validate_metadata"))]
    pub metadata: Option<JsonValue>,
}

/// DTO for updating an existing document. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub content: Option<String>,
    pub path: Option<String>,
    pub status: Option<DocumentStatus>,
    #[validate(custom(function = "validate_metadata"))]
    pub metadata: Option<JsonValue>,
}

/// Store input for inserting a document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub path: String,
    pub status: DocumentStatus,
    pub author_id: DbId,
    pub last_editor_id: Option<DbId>,
    pub github_path: Option<String>,
    pub github_sha: Option<String>,
    pub metadata: JsonValue,
}

/// Store input for patching a document. `None` leaves a column unchanged.
///
/// Review columns are absent on purpose: they only change through
/// `DocumentStore::record_review`.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub path: Option<String>,
    pub status: Option<DocumentStatus>,
    pub last_editor_id: Option<DbId>,
    pub github_path: Option<String>,
    pub github_sha: Option<String>,
    pub metadata: Option<JsonValue>,
}

/// Document metadata must be a JSON object.
pub fn validate_metadata(value: &JsonValue) -> Result<(), validator::ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("metadata_not_object")
            .with_message("Metadata must be a JSON object".into()))
    }
}
