//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Database ===
    /// SQLite connection URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum pooled connections.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    // === CEP Lookup ===
    /// Base URL of the postal-code provider (without the `/{cep}/json/` suffix).
    #[serde(default = "default_cep_lookup_url")]
    pub cep_lookup_url: String,

    /// Outbound request timeout. Unset keeps the HTTP library default.
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Install the Prometheus recorder and expose `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_database_url() -> String {
    "sqlite://database/db.sqlite3".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_cep_lookup_url() -> String {
    "https://viacep.com.br/ws".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            cep_lookup_url: default_cep_lookup_url(),
            http_timeout_ms: None,
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err("DATABASE_URL is required".to_string());
        }

        if !self.database_url.starts_with("sqlite:") {
            return Err("DATABASE_URL must be a sqlite: URL".to_string());
        }

        if self.db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".to_string());
        }

        let lookup_url = Url::parse(&self.cep_lookup_url)
            .map_err(|e| format!("CEP_LOOKUP_URL is not a valid URL: {}", e))?;
        if !matches!(lookup_url.scheme(), "http" | "https") {
            return Err("CEP_LOOKUP_URL must use http or https".to_string());
        }

        if self.http_timeout_ms == Some(0) {
            return Err("HTTP_TIMEOUT_MS must be greater than 0 when set".to_string());
        }

        Ok(())
    }

    /// Provider base URL without a trailing slash.
    pub fn lookup_base(&self) -> &str {
        self.cep_lookup_url.trim_end_matches('/')
    }
}
