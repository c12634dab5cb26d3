//! Linked GitHub repository model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wikidocs_core::types::{DbId, Timestamp};

/// Branch used when a repository is linked without one.
pub const DEFAULT_BRANCH: &str = "main";

/// A row from the `github_repos` table.
///
/// The access token is stored sealed (see `wikidocs_core::secrets`) and is
/// never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GithubRepo {
    pub id: DbId,
    pub owner: String,
    pub name: String,
    pub branch: String,
    #[serde(skip_serializing)]
    pub token_ciphertext: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl GithubRepo {
    /// `owner/name` as GitHub displays it.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// DTO for linking a repository. The token arrives in plaintext.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGithubRepo {
    #[validate(length(min = 1, max = 100, message = "Owner must be 1-100 characters"))]
    pub owner: String,
    #[validate(length(min = 1, max = 100, message = "Repository name must be 1-100 characters"))]
    pub name: String,
    pub branch: Option<String>,
    #[validate(length(min = 1, message = "Token must not be empty"))]
    pub token: String,
}

impl CreateGithubRepo {
    /// Trim every field so whitespace-only values fail validation. A blank
    /// branch becomes `None`.
    pub fn normalized(self) -> Self {
        Self {
            owner: self.owner.trim().to_string(),
            name: self.name.trim().to_string(),
            branch: self
                .branch
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
            token: self.token.trim().to_string(),
        }
    }
}

/// DTO for changing a linked repository. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGithubRepo {
    #[validate(length(min = 1, max = 255, message = "Branch must be 1-255 characters"))]
    pub branch: Option<String>,
    #[validate(length(min = 1, message = "Token must not be empty"))]
    pub token: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateGithubRepo {
    /// Trim the text fields; a whitespace-only value fails validation.
    pub fn normalized(self) -> Self {
        Self {
            branch: self.branch.map(|b| b.trim().to_string()),
            token: self.token.map(|t| t.trim().to_string()),
            is_active: self.is_active,
        }
    }
}

/// Store input for inserting a repository with an already-sealed token.
#[derive(Debug, Clone)]
pub struct NewGithubRepo {
    pub owner: String,
    pub name: String,
    pub branch: String,
    pub token_ciphertext: String,
    pub is_active: bool,
}

/// Store input for patching a repository.
#[derive(Debug, Clone, Default)]
pub struct GithubRepoPatch {
    pub branch: Option<String>,
    pub token_ciphertext: Option<String>,
    pub is_active: Option<bool>,
}
