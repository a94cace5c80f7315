//! Relational store connection settings

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::time::Duration;

use crate::error::DbError;

/// Connection settings for the self-managed Postgres store
///
/// Either `url` or `host` must be set; a URL wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationalConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// `Some(true)` requires TLS, `Some(false)` disables it, unset keeps
    /// the driver default
    #[serde(default)]
    pub ssl: Option<bool>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

fn default_idle_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: default_port(),
            database: None,
            user: None,
            password: None,
            ssl: None,
            max_connections: default_max_connections(),
            idle_timeout_secs: default_idle_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl RelationalConfig {
    /// Whether enough is set to attempt a connection
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
            || self.host.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Build driver connect options
    pub fn connect_options(&self) -> Result<PgConnectOptions, DbError> {
        let options = match (self.url.as_deref(), self.host.as_deref()) {
            (Some(url), _) if !url.is_empty() => url
                .parse::<PgConnectOptions>()
                .map_err(|e| DbError::Configuration(format!("invalid database URL: {}", e)))?,
            (_, Some(host)) if !host.is_empty() => {
                let mut options = PgConnectOptions::new().host(host).port(self.port);
                if let Some(database) = &self.database {
                    options = options.database(database);
                }
                if let Some(user) = &self.user {
                    options = options.username(user);
                }
                if let Some(password) = &self.password {
                    options = options.password(password);
                }
                options
            }
            _ => {
                return Err(DbError::Configuration(
                    "relational store has neither url nor host".to_string(),
                ));
            }
        };

        Ok(match self.ssl {
            Some(true) => options.ssl_mode(PgSslMode::Require),
            Some(false) => options.ssl_mode(PgSslMode::Disable),
            None => options,
        })
    }

    /// Pool sizing and timeouts
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
    }

    /// Host or URL host for log lines, never the password
    pub fn display_target(&self) -> String {
        match self.connect_options().ok() {
            Some(o) => format!(
                "{}:{}/{}",
                o.get_host(),
                o.get_port(),
                o.get_database().unwrap_or_default()
            ),
            None => "<unconfigured>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured() {
        assert!(!RelationalConfig::default().is_configured());
        assert!(
            RelationalConfig {
                host: Some("db.internal".into()),
                ..Default::default()
            }
            .is_configured()
        );
        assert!(
            RelationalConfig {
                url: Some("postgres://u:p@localhost/app".into()),
                ..Default::default()
            }
            .is_configured()
        );
        assert!(
            !RelationalConfig {
                url: Some(String::new()),
                ..Default::default()
            }
            .is_configured()
        );
    }

    #[test]
    fn test_connect_options_from_parts() {
        let config = RelationalConfig {
            host: Some("db.internal".into()),
            port: 6543,
            database: Some("supportpartner".into()),
            user: Some("app".into()),
            password: Some("secret".into()),
            ..Default::default()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("supportpartner"));
        assert_eq!(options.get_username(), "app");
        assert_eq!(config.display_target(), "db.internal:6543/supportpartner");
    }

    #[test]
    fn test_url_wins_over_parts() {
        let config = RelationalConfig {
            url: Some("postgres://u:p@primary:5433/partners".into()),
            host: Some("ignored".into()),
            ..Default::default()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "primary");
        assert_eq!(options.get_port(), 5433);
    }

    #[test]
    fn test_unconfigured_is_an_error() {
        assert!(matches!(
            RelationalConfig::default().connect_options(),
            Err(DbError::Configuration(_))
        ));
        assert_eq!(RelationalConfig::default().display_target(), "<unconfigured>");
    }

    #[test]
    fn test_serde_defaults() {
        let config: RelationalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.idle_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.ssl, None);
    }
}
