//! Review records and DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use wikidocs_core::status::ReviewDecision;
use wikidocs_core::types::{DbId, Timestamp};

use super::document::Document;

/// A row from the `reviews` table. Reviews are append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub document_id: DbId,
    pub reviewer_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: ReviewDecision,
    pub comments: Option<String>,
    /// Free-form list of requested changes.
    pub changes: JsonValue,
    pub created_at: Timestamp,
}

/// DTO for submitting a review decision.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReview {
    pub document_id: DbId,
    pub status: ReviewDecision,
    pub comments: Option<String>,
    pub changes: Option<JsonValue>,
}

/// Store input for the compound review write.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub document_id: DbId,
    pub reviewer_id: DbId,
    pub status: ReviewDecision,
    pub comments: Option<String>,
    pub changes: JsonValue,
}

/// Result of recording a review: the review and the document it moved.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedReview {
    pub review: Review,
    pub document: Document,
}
