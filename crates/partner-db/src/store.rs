//! Relational store over a Postgres pool

use async_trait::async_trait;
use partner_store::{
    Filter, Returning, Row, SelectOptions, Store, StoreError, StoreKind, StoreOutput,
};
use serde_json::Value;
use sqlx::{Either, Executor, PgPool, Statement, TypeInfo};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::RelationalConfig;
use crate::convert::{convert_params, row_to_json};
use crate::error::DbError;
use crate::sql::{self, SqlStatement};

/// Statement text kept in failure logs
const LOGGED_STATEMENT_CHARS: usize = 100;

/// Postgres-backed store for sensitive partner data
#[derive(Clone)]
pub struct RelationalStore {
    pool: PgPool,
}

impl RelationalStore {
    /// Build a pool without connecting
    ///
    /// Connections are opened on first use, so an unreachable server is
    /// discovered by the startup health check rather than here.
    pub fn connect_lazy(config: &RelationalConfig) -> Result<Self, DbError> {
        let options = config.connect_options()?;
        info!(
            "Configuring relational store: {} (max {} connections)",
            config.display_target(),
            config.max_connections
        );

        let pool = config.pool_options().connect_lazy_with(options);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool for advanced usage
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a statement, logging its duration and row count
    pub async fn run(&self, statement: &SqlStatement) -> Result<StoreOutput, DbError> {
        let start = Instant::now();
        let result = self.run_statement(statement).await;

        match &result {
            Ok(output) => debug!(
                duration_ms = start.elapsed().as_millis() as u64,
                rows = output.count.unwrap_or(0),
                "Executed query"
            ),
            Err(e) => error!(
                statement = %truncate(&statement.sql, LOGGED_STATEMENT_CHARS),
                error = %e,
                "Query failed"
            ),
        }
        result
    }

    async fn run_statement(&self, statement: &SqlStatement) -> Result<StoreOutput, DbError> {
        let mut conn = self.pool.acquire().await?;

        // Prepare first so parameters can be bound as the types the server
        // inferred for each placeholder
        let prepared = (&mut *conn).prepare(statement.sql.as_str()).await?;
        let types: Vec<Option<String>> = match prepared.parameters() {
            Some(Either::Left(types)) => types.iter().map(|t| Some(t.name().to_string())).collect(),
            _ => Vec::new(),
        };
        let returns_rows = !prepared.columns().is_empty();

        let query = convert_params(&statement.params, &types)?
            .into_iter()
            .fold(sqlx::query(statement.sql.as_str()), |query, value| {
                value.bind(query)
            });

        if returns_rows {
            let rows = query
                .fetch_all(&mut *conn)
                .await?
                .iter()
                .map(row_to_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(StoreOutput::rows(rows))
        } else {
            let done = query.execute(&mut *conn).await?;
            Ok(StoreOutput::affected(done.rows_affected()))
        }
    }
}

fn truncate(sql: &str, max_chars: usize) -> &str {
    match sql.char_indices().nth(max_chars) {
        Some((end, _)) => &sql[..end],
        None => sql,
    }
}

#[async_trait]
impl Store for RelationalStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Relational
    }

    async fn insert(
        &self,
        table: &str,
        row: &Row,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError> {
        let statement = sql::build_insert(table, row, returning)?;
        Ok(self.run(&statement).await?)
    }

    async fn select(
        &self,
        table: &str,
        options: &SelectOptions,
    ) -> Result<StoreOutput, StoreError> {
        let statement = sql::build_select(table, options)?;
        Ok(self.run(&statement).await?)
    }

    async fn update(
        &self,
        table: &str,
        patch: &Row,
        filter: &Filter,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError> {
        let statement = sql::build_update(table, patch, filter, returning)?;
        Ok(self.run(&statement).await?)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<StoreOutput, StoreError> {
        let statement = sql::build_delete(table, filter)?;
        Ok(self.run(&statement).await?)
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StoreOutput, StoreError> {
        let statement = SqlStatement {
            sql: sql.to_string(),
            params: params.to_vec(),
        };
        Ok(self.run(&statement).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn close(&self) {
        info!("Closing relational store pool");
        self.pool.close().await;
    }
}
