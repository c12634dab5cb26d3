//! Document lifecycle statuses, review decisions, and the transition table.
//!
//! Status values are stored as text in the database; [`DocumentStatus::as_str`]
//! and [`DocumentStatus::from_str`] are the only conversions between the two.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Document status
// ---------------------------------------------------------------------------

/// Where a document sits in the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    PendingReview,
    Approved,
    NeedsRevision,
    Rejected,
}

impl DocumentStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::NeedsRevision => "needs_revision",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "pending_review" => Some(Self::PendingReview),
            "approved" => Some(Self::Approved),
            "needs_revision" => Some(Self::NeedsRevision),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Parse a status string, producing a validation error for unknown values.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::from_str(s).ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid document status '{s}'. Must be one of: {}",
                Self::ALL.join(", ")
            ))
        })
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &[
        "draft",
        "pending_review",
        "approved",
        "needs_revision",
        "rejected",
    ];
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DocumentStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// ---------------------------------------------------------------------------
// Review decision
// ---------------------------------------------------------------------------

/// The verdict a reviewer records against a pending document.
///
/// Each decision maps onto the document status of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    NeedsRevision,
    Rejected,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::NeedsRevision => "needs_revision",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Self::Approved),
            "needs_revision" => Some(Self::NeedsRevision),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// The document status a document takes once this decision is recorded.
    pub fn resulting_status(&self) -> DocumentStatus {
        match self {
            Self::Approved => DocumentStatus::Approved,
            Self::NeedsRevision => DocumentStatus::NeedsRevision,
            Self::Rejected => DocumentStatus::Rejected,
        }
    }

    pub const ALL: &'static [&'static str] = &["approved", "needs_revision", "rejected"];
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ReviewDecision {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid review status '{value}'. Must be one of: {}",
                Self::ALL.join(", ")
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Whether an author (not a reviewer) may move a document from `from` to `to`.
///
/// Review outcomes are deliberately absent: `approved`, `needs_revision` and
/// `rejected` are only reachable through a recorded review.
pub fn is_author_transition(from: DocumentStatus, to: DocumentStatus) -> bool {
    use DocumentStatus::*;

    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (Draft, PendingReview)
            | (PendingReview, Draft)
            | (NeedsRevision, PendingReview)
            | (NeedsRevision, Draft)
            | (Rejected, Draft)
            | (Approved, Draft)
    )
}

/// Validate an author-initiated status change.
///
/// `content` is the document content the document will have after the
/// update; submitting blank content for review is refused.
pub fn validate_author_transition(
    from: DocumentStatus,
    to: DocumentStatus,
    content: &str,
) -> Result<(), CoreError> {
    if !is_author_transition(from, to) {
        return Err(CoreError::Validation(format!(
            "Cannot change document status from '{from}' to '{to}'"
        )));
    }
    if from != to && to == DocumentStatus::PendingReview && content.trim().is_empty() {
        return Err(CoreError::Validation(
            "A document must have content before it can be submitted for review".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a review decision may be applied to a document in `current`.
pub fn validate_review_transition(current: DocumentStatus) -> Result<(), CoreError> {
    if current != DocumentStatus::PendingReview {
        return Err(CoreError::Precondition(format!(
            "Document must be pending review to record a review (current status: '{current}')"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sync state
// ---------------------------------------------------------------------------

/// How far a document has progressed in being linked to a remote file.
///
/// Advances monotonically: `Unlinked -> Linked -> Synced`. A document that
/// is `Linked` but not `Synced` had a sync interrupted or still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Unlinked,
    Linked,
    Synced,
}

impl SyncState {
    pub fn derive(github_path: Option<&str>, github_sha: Option<&str>) -> Self {
        match (github_path, github_sha) {
            (None, _) => Self::Unlinked,
            (Some(_), None) => Self::Linked,
            (Some(_), Some(_)) => Self::Synced,
        }
    }
}
