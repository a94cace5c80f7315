//! Hosted store error types

use partner_store::StoreError;
use serde::Deserialize;
use thiserror::Error;

/// PostgREST codes meaning the relation does not exist
const MISSING_RELATION_CODES: &[&str] = &["42P01", "PGRST205"];

#[derive(Error, Debug)]
pub enum HostedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Hosted store returned error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl HostedError {
    /// Build an API error from a failed response's status and body
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => {
                let message = match (parsed.message, parsed.details) {
                    (Some(message), Some(details)) => format!("{} ({})", message, details),
                    (Some(message), None) => message,
                    (None, Some(details)) => details,
                    (None, None) => format!("HTTP {}", status),
                };
                HostedError::Api {
                    status,
                    code: parsed.code,
                    message,
                }
            }
            Err(_) => HostedError::Api {
                status,
                code: None,
                message: if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                },
            },
        }
    }

    fn is_missing_relation(&self) -> bool {
        match self {
            HostedError::Api { code, .. } => code
                .as_deref()
                .is_some_and(|c| MISSING_RELATION_CODES.contains(&c)),
            _ => false,
        }
    }
}

impl From<HostedError> for StoreError {
    fn from(err: HostedError) -> Self {
        if err.is_missing_relation() {
            return StoreError::UnknownTable(err.to_string());
        }

        match err {
            HostedError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                StoreError::Connection(e.to_string())
            }
            HostedError::Http(e) => StoreError::Rejected(e.to_string()),
            e @ HostedError::InvalidUrl(_) => StoreError::Connection(e.to_string()),
            HostedError::InvalidIdentifier(name) => StoreError::InvalidIdentifier(name),
            HostedError::InvalidQuery(message) => StoreError::InvalidQuery(message),
            HostedError::Api {
                status: 502..=504,
                message,
                ..
            } => StoreError::Connection(message),
            HostedError::Api { message, .. } => StoreError::Rejected(message),
            e @ HostedError::InvalidResponse(_) => StoreError::Rejected(e.to_string()),
        }
    }
}
