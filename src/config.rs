use serde::{Deserialize, Serialize};
use std::path::Path;

/// Secret used when none is configured. Only acceptable outside production.
pub const PLACEHOLDER_SECRET_KEY: &str = "dev";

/// File name of the local SQLite database, relative to the app root.
pub const SQLITE_FILE_NAME: &str = "db.sqlite3";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed database URL: {0}")]
    MalformedDatabaseUrl(String),
    #[error("unsupported database scheme '{0}' (expected postgres or sqlite)")]
    UnsupportedScheme(String),
    #[error("the placeholder secret key must not be used in production; set SECRET_KEY")]
    PlaceholderSecretInProduction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub max_connections: u32,
    /// Directory holding the SQLite file when no database URL is set.
    /// Defaults to the directory of the running executable.
    pub app_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub secret_key: Option<String>,
    pub environment: RuntimeEnvironment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Development,
    Production,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            max_connections: 5,
            app_root: default_app_root(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            environment: RuntimeEnvironment::Development,
        }
    }
}

/// Directory containing the running executable, or `.` if it cannot be determined.
fn default_app_root() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.display().to_string()))
        .unwrap_or_else(|| ".".to_string())
}

impl RuntimeEnvironment {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => RuntimeEnvironment::Production,
            _ => RuntimeEnvironment::Development,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // e.g. COMMISSION_SERVER__PORT=8080
        config = config.add_source(
            config::Environment::with_prefix("COMMISSION")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // Deployment platforms set these without the prefix.
        if let Ok(env) = std::env::var("APP_ENV") {
            app_config.security.environment = RuntimeEnvironment::from_env_value(&env);
        }
        if app_config.security.secret_key.is_none() {
            app_config.security.secret_key = std::env::var("SECRET_KEY")
                .or_else(|_| std::env::var("FLASK_SECRET_KEY"))
                .ok();
        }

        Ok(app_config)
    }

    /// Resolve the database URL from config, then `DATABASE_URL`, then the local SQLite file.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        let configured = self
            .database
            .connection_string
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok());

        resolve_database_url(configured.as_deref(), Path::new(&self.database.app_root))
    }

    /// The signing secret for the web layer.
    pub fn secret_key(&self) -> Result<String, ConfigError> {
        resolve_secret_key(
            self.security.secret_key.as_deref(),
            self.security.environment,
        )
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Pick the database URL: a configured one is normalized, an absent or empty
/// one falls back to `<app_root>/db.sqlite3`.
pub fn resolve_database_url(configured: Option<&str>, app_root: &Path) -> Result<String, ConfigError> {
    match configured.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => normalize_database_url(url),
        None => Ok(format!(
            "sqlite://{}?mode=rwc",
            app_root.join(SQLITE_FILE_NAME).display()
        )),
    }
}

/// Rewrite PostgreSQL scheme variants to the `postgres://` form sqlx expects.
///
/// `postgresql://`, `postgres+<driver>://` and `postgresql+<driver>://` all
/// become `postgres://`; only the scheme is touched. `sqlite:` URLs pass
/// through unchanged.
pub fn normalize_database_url(url: &str) -> Result<String, ConfigError> {
    let Some((scheme, rest)) = url.split_once(':') else {
        return Err(ConfigError::MalformedDatabaseUrl(url.to_string()));
    };

    let base_scheme = scheme
        .split_once('+')
        .map(|(base, _driver)| base)
        .unwrap_or(scheme)
        .to_ascii_lowercase();

    match base_scheme.as_str() {
        "postgres" | "postgresql" => {
            let Some(authority) = rest.strip_prefix("//") else {
                return Err(ConfigError::MalformedDatabaseUrl(url.to_string()));
            };
            if authority.is_empty() {
                return Err(ConfigError::MalformedDatabaseUrl(url.to_string()));
            }
            Ok(format!("postgres://{}", authority))
        }
        "sqlite" if scheme.eq_ignore_ascii_case("sqlite") => Ok(url.to_string()),
        "" => Err(ConfigError::MalformedDatabaseUrl(url.to_string())),
        _ => Err(ConfigError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Use the configured secret, falling back to the placeholder outside production.
pub fn resolve_secret_key(
    configured: Option<&str>,
    environment: RuntimeEnvironment,
) -> Result<String, ConfigError> {
    let secret = configured
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .unwrap_or(PLACEHOLDER_SECRET_KEY);

    if secret == PLACEHOLDER_SECRET_KEY {
        if environment == RuntimeEnvironment::Production {
            return Err(ConfigError::PlaceholderSecretInProduction);
        }
        log::warn!("Using the placeholder secret key; set SECRET_KEY before deploying");
    }

    Ok(secret.to_string())
}
