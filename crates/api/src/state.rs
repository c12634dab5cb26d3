use std::sync::Arc;

use wikidocs_core::secrets::TokenCipher;
use wikidocs_db::DocumentStore;
use wikidocs_github::SyncEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Document store (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn DocumentStore>,
    /// Pull/push engine, sharing `store`.
    pub sync: Arc<SyncEngine>,
    /// Seals repository tokens before they are stored.
    pub cipher: TokenCipher,
    pub config: Arc<ServerConfig>,
}
