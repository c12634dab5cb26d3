use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wikidocs_api::config::ServerConfig;
use wikidocs_api::router::build_app_router;
use wikidocs_api::startup;
use wikidocs_api::state::AppState;
use wikidocs_core::secrets::TokenCipher;
use wikidocs_db::{DocumentStore, PgStore};
use wikidocs_github::{GitHubApi, SyncConfig, SyncEngine};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wikidocs_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let cipher = TokenCipher::from_base64(&config.token_encryption_key)
        .expect("TOKEN_ENCRYPTION_KEY is invalid");

    // --- Database ---
    let pool = wikidocs_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    wikidocs_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    wikidocs_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store: Arc<dyn DocumentStore> = Arc::new(PgStore::new(pool));

    startup::seed(store.as_ref(), &config.admin)
        .await
        .expect("Failed to seed database");

    // --- GitHub ---
    let github = GitHubApi::new(
        &config.github_api_url,
        Duration::from_secs(config.github_timeout_secs),
    )
    .expect("Failed to build GitHub client");
    let sync = SyncEngine::new(
        Arc::clone(&store),
        Arc::new(github),
        cipher.clone(),
        SyncConfig {
            pulled_status: config.sync_default_status,
        },
    );
    tracing::info!(
        api = %config.github_api_url,
        pulled_status = %config.sync_default_status,
        "GitHub sync configured",
    );

    // --- App state ---
    let state = AppState {
        store,
        sync: Arc::new(sync),
        cipher,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
