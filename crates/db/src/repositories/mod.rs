//! Per-table query modules for PostgreSQL.
//!
//! Each repository is a zero-sized struct with static async methods taking
//! a pool. [`crate::PgStore`] composes them behind the store trait.

pub mod document_repo;
pub mod folder_repo;
pub mod github_repo_repo;
pub mod review_repo;
pub mod user_repo;

pub use document_repo::DocumentRepo;
pub use folder_repo::FolderRepo;
pub use github_repo_repo::GithubRepoRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
