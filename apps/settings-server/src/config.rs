//! Layered server configuration.
//!
//! Sources, lowest priority first: built-in defaults, the YAML file given with
//! `--config`, `APP__*` environment variables (`__` separates nesting levels),
//! then command line overrides.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;
use settings_auth::{JwtConfig, JwtVerifier};
use user_settings::UserSettingsConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub auth: JwtConfig,
    pub settings: UserSettingsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Whole-request deadline, answered with 504 when exceeded.
    pub request_timeout_secs: u64,
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            request_timeout_secs: 30,
            api_prefix: "/api/v1".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Base `EnvFilter` directive, e.g. `info` or `debug,sqlx=warn`.
    pub level: String,
    /// `compact` or `json`.
    pub format: String,
    /// Also append logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origins: Vec<String>,
    /// Empty mirrors the preflight request.
    pub allowed_methods: Vec<String>,
    /// Empty mirrors the preflight request.
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["http://localhost:3000".to_owned()],
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            allow_credentials: true,
            max_age_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `postgres://…` in production, `sqlite://…` for development and tests.
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://settings.db?mode=rwc".to_owned(),
            max_connections: 10,
            connect_timeout_ms: 5_000,
            run_migrations: true,
        }
    }
}

impl AppConfig {
    /// Merge defaults, the optional YAML file and `APP__*` environment variables.
    ///
    /// # Errors
    /// Unreadable file, malformed values or unknown keys.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("APP__").split("__"))
            .extract()
            .context("invalid configuration")
    }

    /// Apply `--port` and `-v` on top of the loaded configuration.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) {
        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
        }
        match verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
    }

    /// Fail fast on settings that would only break at request time.
    ///
    /// # Errors
    /// Missing signing secret or an invalid CORS combination.
    pub fn validate(&self) -> anyhow::Result<()> {
        JwtVerifier::from_config(&self.auth).context("auth")?;
        crate::cors::build_cors_layer(&self.cors).context("cors")?;
        if !self.server.api_prefix.starts_with('/') {
            anyhow::bail!("server.api_prefix must start with '/'");
        }
        Ok(())
    }
}
