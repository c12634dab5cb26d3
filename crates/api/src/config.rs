use wikidocs_core::status::DocumentStatus;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except the secrets and the database URL has a default suitable
/// for local development.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Root of the GitHub REST API (default: `https://api.github.com`).
    pub github_api_url: String,
    /// Per-request timeout for GitHub calls in seconds (default: `30`).
    pub github_timeout_secs: u64,
    /// Status given to documents created by a pull (default: `draft`).
    pub sync_default_status: DocumentStatus,
    /// Base64 of the 32-byte key repository tokens are sealed with.
    pub token_encryption_key: String,
    pub admin: AdminSeed,
}

/// Credentials for the administrator created on first start.
#[derive(Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    /// `None` skips seeding the administrator.
    pub password: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("jwt", &self.jwt)
            .field("github_api_url", &self.github_api_url)
            .field("github_timeout_secs", &self.github_timeout_secs)
            .field("sync_default_status", &self.sync_default_status)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | **required**               |
    /// | `GITHUB_API_URL`       | `https://api.github.com`   |
    /// | `GITHUB_TIMEOUT_SECS`  | `30`                       |
    /// | `SYNC_DEFAULT_STATUS`  | `draft`                    |
    /// | `TOKEN_ENCRYPTION_KEY` | **required**               |
    /// | `ADMIN_USERNAME`       | `admin`                    |
    /// | `ADMIN_EMAIL`          | `admin@wikidocs.local`     |
    /// | `ADMIN_PASSWORD`       | unset (no admin seeded)    |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a value does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let github_api_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| "https://api.github.com".into());

        let github_timeout_secs: u64 = std::env::var("GITHUB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("GITHUB_TIMEOUT_SECS must be a valid u64");

        let sync_default_status = std::env::var("SYNC_DEFAULT_STATUS")
            .ok()
            .map(|s| {
                DocumentStatus::from_str(s.trim())
                    .unwrap_or_else(|| panic!("SYNC_DEFAULT_STATUS '{s}' is not a document status"))
            })
            .unwrap_or(DocumentStatus::Draft);

        let token_encryption_key = std::env::var("TOKEN_ENCRYPTION_KEY")
            .expect("TOKEN_ENCRYPTION_KEY must be set (base64 of 32 bytes)");

        let admin = AdminSeed {
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@wikidocs.local".into()),
            password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            jwt,
            github_api_url,
            github_timeout_secs,
            sync_default_status,
            token_encryption_key,
            admin,
        }
    }
}
