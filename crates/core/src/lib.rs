//! Pure domain rules for the wikidocs service.
//!
//! Nothing in this crate performs I/O. The store, sync engine and HTTP layer
//! all build on these types so the rules live in exactly one place.

pub mod error;
pub mod folder_tree;
pub mod naming;
pub mod roles;
pub mod secrets;
pub mod status;
pub mod types;
