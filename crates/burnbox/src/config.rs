//! Configuration loading and validation for the burnbox service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable cannot be parsed or fails
//! validation. Every variable has a default, so an empty environment yields a
//! memory-backed service on port 8080.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Which secret store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process expiring key-value cache: native per-entry TTL, atomic
    /// consume.
    #[default]
    Memory,
    /// SQLite table: creation timestamps, expiry computed lazily at read
    /// time.
    Sqlite,
}

impl StoreBackend {
    /// Stable lowercase name, as accepted in configuration and reported by
    /// the health endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Sqlite => "sqlite",
        }
    }
}

/// Validated burnbox service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Secret store backend to use.
    #[serde(default)]
    pub store_backend: StoreBackend,

    /// SQLite database URL; only consulted when `store_backend` is `sqlite`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Namespace prepended to physical keys in the memory backend.
    #[serde(default = "default_store_prefix")]
    pub store_prefix: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP endpoint for span export. When unset, only JSON logs are
    /// emitted.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_url() -> String {
    "sqlite://burnbox.db?mode=rwc".into()
}
fn default_store_prefix() -> String {
    "burnbox".into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be non-zero");
        }
        if self.store_backend == StoreBackend::Sqlite && self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is required when STORE_BACKEND is sqlite");
        }
        Ok(())
    }
}
