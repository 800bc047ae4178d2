//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. User config: `~/.config/ontograph/config.toml` (XDG) or platform config dir
//! 3. Project config: `.ontograph.toml`
//! 4. Conventional Neo4j variables: `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD`, `NEO4J_DATABASE`
//! 5. Environment variables: `ONTOGRAPH_*`, nested with `__`
//!    (e.g. `ONTOGRAPH_AUTH__JWT_SECRET_KEY`)
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! transport = "http"
//!
//! [auth]
//! enabled = true
//! jwt_secret_key_file = "/run/secrets/jwt_secret"
//!
//! [neo4j]
//! uri = "bolt://localhost:7687"
//! username = "neo4j"
//! password = "password"
//! ```

use std::ops::Deref;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Default location of the sample news dataset.
pub const DEFAULT_NEWS_URL: &str =
    "https://raw.githubusercontent.com/tomasonjo/blog-datasets/main/news_articles.csv";

/// Minimum accepted length for the JWT signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, one year.
pub const MAX_EXPIRY_HOURS: i64 = 24 * 365;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

impl ConfigError {
    /// Creates a validation error with a plain message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::from(figment::Error::from(message.into()))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub neo4j: Neo4jConfig,
    pub data: DataConfig,
}

/// MCP transport selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http => write!(f, "http"),
        }
    }
}

/// MCP server identity and listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server name reported to MCP clients.
    pub name: String,
    /// Host to bind for the HTTP transport.
    pub host: String,
    /// Port to bind for the HTTP transport.
    pub port: u16,
    /// Preferred transport, reported by `server://info`.
    pub transport: Transport,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Product Management MCP Server".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            transport: Transport::Stdio,
        }
    }
}

/// JWT authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether gated tools require a bearer token.
    pub enabled: bool,
    /// HS256 signing secret (at least 32 characters).
    pub jwt_secret_key: Option<String>,
    /// File holding the signing secret, used when `jwt_secret_key` is unset.
    pub jwt_secret_key_file: Option<PathBuf>,
    /// Token lifetime in hours.
    pub jwt_expiry_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jwt_secret_key: None,
            jwt_secret_key_file: None,
            jwt_expiry_hours: 24,
        }
    }
}

impl AuthConfig {
    /// Resolves the signing secret from the inline value or the secret file.
    ///
    /// Returns `Ok(None)` when neither is configured.
    pub fn secret(&self) -> Result<Option<String>, ConfigError> {
        if let Some(secret) = self.jwt_secret_key.as_ref().filter(|s| !s.is_empty()) {
            return Ok(Some(secret.clone()));
        }

        match &self.jwt_secret_key_file {
            Some(path) => read_secret_file(path).map(Some),
            None => Ok(None),
        }
    }
}

fn read_secret_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            ConfigError::invalid(format!(
                "failed to read JWT secret from {}: {}",
                path.display(),
                e
            ))
        })
}

/// Neo4j connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`.
    pub uri: String,
    pub username: String,
    pub password: String,
    /// Database name.
    pub database: String,
    /// Connection pool size.
    pub max_connections: usize,
    /// Rows fetched per round trip.
    pub fetch_size: usize,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Data loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV source for the news dataset.
    pub news_url: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            news_url: DEFAULT_NEWS_URL.to_string(),
        }
    }
}

impl Config {
    /// Load config with layered resolution (defaults → user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(Self::user_config_path(), Path::new(".ontograph.toml"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Builds the layered figment for the given user and project files.
    pub fn figment(user_config: impl AsRef<Path>, project_config: impl AsRef<Path>) -> Figment {
        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config.as_ref()))
            // Layer 2: Project config
            .merge(Toml::file(project_config.as_ref()))
            // Layer 3: Conventional NEO4J_* variables
            .merge(
                Env::prefixed("NEO4J_")
                    .only(&["uri", "username", "password", "database"])
                    .map(|key| format!("neo4j.{}", key).into()),
            )
            // Layer 4: Application environment variables (highest priority)
            .merge(Env::prefixed("ONTOGRAPH_").split("__"))
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port must be between 1 and 65535"));
        }

        if self.neo4j.uri.trim().is_empty() {
            return Err(ConfigError::invalid("neo4j.uri is required"));
        }

        if self.neo4j.username.trim().is_empty() {
            return Err(ConfigError::invalid("neo4j.username is required"));
        }

        if !(1..=MAX_EXPIRY_HOURS).contains(&self.auth.jwt_expiry_hours) {
            return Err(ConfigError::invalid(format!(
                "auth.jwt_expiry_hours must be between 1 and {}",
                MAX_EXPIRY_HOURS
            )));
        }

        if self.auth.enabled {
            match self.auth.secret()? {
                None => {
                    return Err(ConfigError::invalid(
                        "auth.jwt_secret_key or auth.jwt_secret_key_file is required when auth is enabled",
                    ))
                }
                Some(secret) if secret.len() < MIN_SECRET_LEN => {
                    return Err(ConfigError::invalid(format!(
                        "JWT secret must be at least {} characters long",
                        MIN_SECRET_LEN
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// User config path: ~/.config/ontograph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("ontograph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("ontograph").join("config.toml"))
            .unwrap_or_default()
    }
}
