//! Hosted store client

use async_trait::async_trait;
use partner_store::{
    Filter, Returning, Row, SelectOptions, Store, StoreError, StoreKind, StoreOutput,
    is_identifier,
};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::HostedError;
use crate::request::{self, PREFER_REPRESENTATION};

/// Hosted client configuration
#[derive(Clone, Debug)]
pub struct HostedClientConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Anonymous API key, sent as both `apikey` and bearer token
    pub api_key: String,
    /// Table read by `ping`
    pub health_table: String,
    /// Per-request timeout
    pub timeout: Duration,
}

/// PostgREST client implementing [`Store`]
pub struct HostedClient {
    config: HostedClientConfig,
    client: Client,
    base: Url,
}

impl HostedClient {
    /// Create a new hosted client
    pub fn new(config: HostedClientConfig) -> Result<Self, HostedError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        // A trailing slash keeps `join` from replacing the last segment
        let mut base = config.url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?.join("rest/v1/")?;

        info!("Created hosted client for {}", config.url);

        Ok(Self {
            config,
            client,
            base,
        })
    }

    /// REST endpoint for a table
    pub fn endpoint(&self, table: &str) -> Result<Url, HostedError> {
        if !is_identifier(table) {
            return Err(HostedError::InvalidIdentifier(table.to_string()));
        }
        Ok(self.base.join(table)?)
    }

    fn request(&self, method: Method, table: &str) -> Result<RequestBuilder, HostedError> {
        let url = self.endpoint(table)?;
        debug!("{} {}", method, url);

        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key))
    }

    /// Send a request and parse the returned rows
    async fn send(&self, request: RequestBuilder) -> Result<Vec<Row>, HostedError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(HostedError::from_response(status.as_u16(), &body));
        }

        parse_rows(&body)
    }
}

/// Parse a success body: an array of rows, a single row, or nothing
fn parse_rows(body: &str) -> Result<Vec<Row>, HostedError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(body)
        .map_err(|e| HostedError::InvalidResponse(e.to_string()))?
    {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(HostedError::InvalidResponse(format!(
                    "expected object row, got {}",
                    other
                ))),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        Value::Null => Ok(Vec::new()),
        other => Err(HostedError::InvalidResponse(format!(
            "expected rows, got {}",
            other
        ))),
    }
}

#[async_trait]
impl Store for HostedClient {
    fn kind(&self) -> StoreKind {
        StoreKind::Hosted
    }

    async fn insert(
        &self,
        table: &str,
        row: &Row,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError> {
        let request = self
            .request(Method::POST, table)?
            .header("Prefer", request::insert_preference(returning))
            .query(&request::returning_pairs(returning)?)
            .json(row);

        let rows = self.send(request).await?;
        if returning.is_nothing() {
            Ok(StoreOutput::affected(1))
        } else {
            Ok(StoreOutput::rows(rows))
        }
    }

    async fn select(
        &self,
        table: &str,
        options: &SelectOptions,
    ) -> Result<StoreOutput, StoreError> {
        let request = self
            .request(Method::GET, table)?
            .query(&request::select_pairs(options)?);

        Ok(StoreOutput::rows(self.send(request).await?))
    }

    async fn update(
        &self,
        table: &str,
        patch: &Row,
        filter: &Filter,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError> {
        if patch.is_empty() {
            return Err(HostedError::InvalidQuery(
                "update requires at least one column".to_string(),
            )
            .into());
        }
        request::require_filter(filter, "update")?;

        // Always ask for the rows back so the affected count is known
        let select = match returning {
            Returning::Nothing => request::returning_pairs(&Returning::All)?,
            other => request::returning_pairs(other)?,
        };
        let request = self
            .request(Method::PATCH, table)?
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&request::filter_pairs(filter)?)
            .query(&select)
            .json(patch);

        let rows = self.send(request).await?;
        let count = rows.len() as u64;
        if returning.is_nothing() {
            Ok(StoreOutput::affected(count))
        } else {
            Ok(StoreOutput::new(rows, Some(count)))
        }
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<StoreOutput, StoreError> {
        request::require_filter(filter, "delete")?;

        let request = self
            .request(Method::DELETE, table)?
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&request::filter_pairs(filter)?);

        let rows = self.send(request).await?;
        Ok(StoreOutput::affected(rows.len() as u64))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let request = self
            .request(Method::GET, &self.config.health_table)?
            .query(&[("select", "id"), ("limit", "1")]);

        self.send(request).await?;
        Ok(())
    }
}
