//! Configuration loading
//!
//! Layers, lowest first: built-in defaults, the TOML file, then
//! `SUPPORTPARTNER__SECTION__KEY` variables, then the deployment
//! variables the hosted and relational stores are usually set up with.

use anyhow::{Context, Result, bail};
use ::config::{Environment, File, FileFormat};
use partner_core::RouterConfig;
use partner_db::RelationalConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hosted: HostedConfig,
    #[serde(default)]
    pub relational: RelationalConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Hosted backend (Supabase) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    /// Table read by health checks
    #[serde(default = "default_health_table")]
    pub health_table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            health_table: default_health_table(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HostedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_enabled")]
    pub enabled: bool,
    /// The hosted backend's JWT secret
    #[serde(default)]
    pub jwt_secret: String,
    /// Expected `aud` claim; empty skips the check
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_auth_enabled(),
            jwt_secret: String::new(),
            audience: default_audience(),
        }
    }
}

impl AuthConfig {
    pub fn audience(&self) -> Option<String> {
        Some(self.audience.clone()).filter(|a| !a.is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_health_table() -> String {
    "user_profiles".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_auth_enabled() -> bool {
    true
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// First non-empty value among `names`
fn first_var(env: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env(name))
        .find(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from the file and the process environment
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load configuration, reading deployment variables through `env`
    pub fn load_with(path: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if Path::new(path).exists() {
            info!("Loading configuration from {}", path);
        } else {
            info!("Config file not found at {}, using defaults", path);
        }

        let mut config: Config = ::config::Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("SUPPORTPARTNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration from {}", path))?;

        config.apply_deployment_env(&env)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay the deployment variables
    fn apply_deployment_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = first_var(env, &["SUPABASE_URL", "VITE_SUPABASE_URL"]) {
            self.hosted.url = url;
        }
        if let Some(key) = first_var(env, &["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]) {
            self.hosted.anon_key = key;
        }
        if let Some(secret) = first_var(env, &["SUPABASE_JWT_SECRET"]) {
            self.auth.jwt_secret = secret;
        }

        let relational = &mut self.relational;
        if let Some(url) = first_var(env, &["DATABASE_URL"]) {
            relational.url = Some(url);
        }
        if let Some(host) = first_var(env, &["DB_HOST"]) {
            relational.host = Some(host);
        }
        if let Some(port) = first_var(env, &["DB_PORT"]) {
            relational.port = port
                .parse()
                .with_context(|| format!("Invalid DB_PORT: {}", port))?;
        }
        if let Some(database) = first_var(env, &["DB_NAME"]) {
            relational.database = Some(database);
        }
        if let Some(user) = first_var(env, &["DB_USER"]) {
            relational.user = Some(user);
        }
        if let Some(password) = first_var(env, &["DB_PASSWORD"]) {
            relational.password = Some(password);
        }
        if relational.ssl.is_none() && first_var(env, &["NODE_ENV"]).as_deref() == Some("production") {
            relational.ssl = Some(true);
        }

        if let Some(port) = first_var(env, &["PORT"]) {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.hosted.url.is_empty() || self.hosted.anon_key.is_empty() {
            bail!(
                "Missing hosted backend configuration: set hosted.url and hosted.anon_key \
                 (or SUPABASE_URL and SUPABASE_ANON_KEY)"
            );
        }
        if self.auth.enabled && self.auth.jwt_secret.is_empty() {
            bail!(
                "Authentication is enabled but no JWT secret is set: set auth.jwt_secret \
                 (or SUPABASE_JWT_SECRET), or disable auth for development"
            );
        }
        Ok(())
    }
}
