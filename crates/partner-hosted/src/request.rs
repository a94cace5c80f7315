//! Query envelope to PostgREST request translation
//!
//! Filters become `column=eq.value` or `column=is.null` pairs, ordering
//! becomes `order=column.asc|desc`, and projections become `select=`.

use partner_store::{Condition, Filter, Returning, SelectOptions, is_identifier};
use serde_json::Value;

use crate::error::HostedError;

/// `Prefer` header asking for the written rows back
pub const PREFER_REPRESENTATION: &str = "return=representation";
/// `Prefer` header asking for an empty write response
pub const PREFER_MINIMAL: &str = "return=minimal";

/// Query string pairs in insertion order
pub type QueryPairs = Vec<(String, String)>;

fn check(name: &str) -> Result<&str, HostedError> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(HostedError::InvalidIdentifier(name.to_string()))
    }
}

/// Render a filter operand the way PostgREST expects it
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn projection<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<String, HostedError> {
    let columns = columns
        .into_iter()
        .map(|c| if c == "*" { Ok(c) } else { check(c) })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns.join(","))
}

/// One pair per condition
pub fn filter_pairs(filter: &Filter) -> Result<QueryPairs, HostedError> {
    filter
        .conditions()
        .iter()
        .map(|condition| match condition {
            Condition::Eq { column, value } => {
                Ok((check(column)?.to_string(), format!("eq.{}", literal(value))))
            }
            Condition::IsNull { column } => Ok((check(column)?.to_string(), "is.null".to_string())),
        })
        .collect()
}

/// Pairs for a read
pub fn select_pairs(options: &SelectOptions) -> Result<QueryPairs, HostedError> {
    let mut pairs = QueryPairs::new();

    let select = match &options.columns {
        Some(columns) => projection(columns.iter().map(String::as_str))?,
        None => "*".to_string(),
    };
    pairs.push(("select".to_string(), select));
    pairs.extend(filter_pairs(&options.filter)?);

    if let Some(order) = &options.order_by {
        pairs.push((
            "order".to_string(),
            format!(
                "{}.{}",
                check(&order.column)?,
                if order.ascending { "asc" } else { "desc" }
            ),
        ));
    }

    if let Some(limit) = options.effective_limit() {
        pairs.push(("limit".to_string(), limit.to_string()));
    }

    if let Some(offset) = options.offset {
        pairs.push(("offset".to_string(), offset.to_string()));
    }

    Ok(pairs)
}

/// `select=` pair for a write that returns rows
pub fn returning_pairs(returning: &Returning) -> Result<QueryPairs, HostedError> {
    match returning.projection() {
        Some(columns) => Ok(vec![("select".to_string(), projection(columns)?)]),
        None => Ok(QueryPairs::new()),
    }
}

/// `Prefer` header for an insert
pub fn insert_preference(returning: &Returning) -> &'static str {
    if returning.is_nothing() {
        PREFER_MINIMAL
    } else {
        PREFER_REPRESENTATION
    }
}

/// Refuse writes that would touch every row
pub fn require_filter(filter: &Filter, operation: &str) -> Result<(), HostedError> {
    if filter.is_empty() {
        return Err(HostedError::InvalidQuery(format!(
            "{} requires at least one filter condition",
            operation
        )));
    }
    Ok(())
}
