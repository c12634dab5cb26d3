//! First-run seeding.
//!
//! Runs on every start and only creates what is missing: the administrator
//! account (when `ADMIN_PASSWORD` is set), the two root folders, and a sample
//! document the first time the administrator is created.

use serde_json::json;
use wikidocs_core::roles::ROLE_ADMIN;
use wikidocs_core::status::DocumentStatus;
use wikidocs_db::models::document::NewDocument;
use wikidocs_db::models::folder::CreateFolder;
use wikidocs_db::models::user::CreateUser;
use wikidocs_db::{DocumentStore, StoreError};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::AdminSeed;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid admin password: {0}")]
    WeakPassword(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// `(path, name, description)` of the folders every installation starts with.
const ROOT_FOLDERS: &[(&str, &str, &str)] = &[
    ("api", "API Documentation", "API related documentation"),
    ("guides", "User Guides", "User guides and tutorials"),
];

const SAMPLE_PATH: &str = "api/authentication";

/// Seed the store. Safe to call on every start.
pub async fn seed(store: &dyn DocumentStore, admin: &AdminSeed) -> Result<(), SeedError> {
    for (path, name, description) in ROOT_FOLDERS {
        if store.find_folder_by_path(path).await?.is_some() {
            continue;
        }
        let folder = CreateFolder {
            name: name.to_string(),
            path: path.to_string(),
            parent_path: None,
            description: Some(description.to_string()),
        };
        store.create_folder(&folder).await?;
        tracing::info!(path, "Seeded folder");
    }

    if store.find_user_by_username(&admin.username).await?.is_some() {
        tracing::debug!(username = %admin.username, "Admin user already present");
        return Ok(());
    }
    let Some(password) = admin.password.as_deref() else {
        tracing::warn!("ADMIN_PASSWORD is not set; no admin user was created");
        return Ok(());
    };
    validate_password_strength(password, MIN_PASSWORD_LENGTH).map_err(SeedError::WeakPassword)?;
    let password_hash = hash_password(password).map_err(|e| SeedError::Hash(e.to_string()))?;

    let user = store
        .create_user(&CreateUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        })
        .await?;
    tracing::info!(user_id = user.id, username = %user.username, "Seeded admin user");

    if store.find_document_by_path(SAMPLE_PATH).await?.is_none() {
        let document = store
            .create_document(&NewDocument {
                title: "Authentication Guide".to_string(),
                content: "# Authentication Guide\n\nThis guide covers authentication methods..."
                    .to_string(),
                path: SAMPLE_PATH.to_string(),
                status: DocumentStatus::Draft,
                author_id: user.id,
                last_editor_id: Some(user.id),
                github_path: None,
                github_sha: None,
                metadata: json!({}),
            })
            .await?;
        tracing::info!(document_id = document.id, "Seeded sample document");
    }
    Ok(())
}
