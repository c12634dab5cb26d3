//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` request DTO as accepted over HTTP
//! - The store-level insert/patch inputs the workflow and sync layers build

pub mod document;
pub mod folder;
pub mod github_repo;
pub mod review;
pub mod user;
