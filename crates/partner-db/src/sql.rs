//! Parameterized SQL builder
//!
//! Builds `INSERT`/`SELECT`/`UPDATE`/`DELETE` text with `$n` placeholders
//! and the matching parameter list. Placeholders are numbered by the order
//! in which values are pushed, so an `UPDATE` numbers its `SET` values
//! `$1..$n` and its `WHERE` values from `$n+1` on.

use partner_store::{Condition, Filter, Returning, Row, SelectOptions, is_identifier};
use serde_json::Value;

use crate::error::DbError;

/// SQL text plus positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Positional parameter list; each pushed value gets the next placeholder
#[derive(Debug, Default)]
struct Params {
    values: Vec<Value>,
}

impl Params {
    fn push(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}

fn identifier(name: &str) -> Result<&str, DbError> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(DbError::InvalidIdentifier(name.to_string()))
    }
}

/// Comma separated column list; `*` is allowed
fn column_list<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<String, DbError> {
    let columns = columns
        .into_iter()
        .map(|c| if c == "*" { Ok(c) } else { identifier(c) })
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(DbError::InvalidQuery("empty column list".to_string()));
    }
    Ok(columns.join(", "))
}

fn where_clause(filter: &Filter, params: &mut Params) -> Result<String, DbError> {
    let conditions = filter
        .conditions()
        .iter()
        .map(|condition| match condition {
            Condition::Eq { column, value } => {
                Ok(format!("{} = {}", identifier(column)?, params.push(value.clone())))
            }
            Condition::IsNull { column } => Ok(format!("{} IS NULL", identifier(column)?)),
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    Ok(conditions.join(" AND "))
}

fn returning_clause(returning: &Returning) -> Result<String, DbError> {
    match returning.projection() {
        Some(columns) => Ok(format!(" RETURNING {}", column_list(columns)?)),
        None => Ok(String::new()),
    }
}

fn require_filter(filter: &Filter, operation: &str) -> Result<(), DbError> {
    if filter.is_empty() {
        return Err(DbError::InvalidQuery(format!(
            "{} requires at least one filter condition",
            operation
        )));
    }
    Ok(())
}

/// `INSERT INTO t (a, b) VALUES ($1, $2) [RETURNING ...]`
pub fn build_insert(
    table: &str,
    row: &Row,
    returning: &Returning,
) -> Result<SqlStatement, DbError> {
    let table = identifier(table)?;
    let mut params = Params::default();

    let sql = if row.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", table)
    } else {
        let columns = column_list(row.keys().map(String::as_str))?;
        let placeholders: Vec<String> = row.values().map(|v| params.push(v.clone())).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns,
            placeholders.join(", ")
        )
    };

    Ok(SqlStatement {
        sql: sql + &returning_clause(returning)?,
        params: params.values,
    })
}

/// `SELECT cols FROM t [WHERE ...] [ORDER BY c ASC|DESC] [LIMIT n] [OFFSET m]`
///
/// Limit and offset are validated integers and are written inline.
pub fn build_select(table: &str, options: &SelectOptions) -> Result<SqlStatement, DbError> {
    let table = identifier(table)?;
    let mut params = Params::default();

    let columns = match &options.columns {
        Some(columns) => column_list(columns.iter().map(String::as_str))?,
        None => "*".to_string(),
    };
    let mut sql = format!("SELECT {} FROM {}", columns, table);

    if !options.filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_clause(&options.filter, &mut params)?);
    }

    if let Some(order) = &options.order_by {
        sql.push_str(&format!(
            " ORDER BY {} {}",
            identifier(&order.column)?,
            if order.ascending { "ASC" } else { "DESC" }
        ));
    }

    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    if let Some(offset) = options.offset {
        sql.push_str(&format!(" OFFSET {}", offset));
    }

    Ok(SqlStatement {
        sql,
        params: params.values,
    })
}

/// `UPDATE t SET a = $1, b = $2 WHERE id = $3 [RETURNING ...]`
pub fn build_update(
    table: &str,
    patch: &Row,
    filter: &Filter,
    returning: &Returning,
) -> Result<SqlStatement, DbError> {
    let table = identifier(table)?;
    if patch.is_empty() {
        return Err(DbError::InvalidQuery("update requires at least one column".to_string()));
    }
    require_filter(filter, "update")?;

    let mut params = Params::default();
    let assignments = patch
        .iter()
        .map(|(column, value)| Ok(format!("{} = {}", identifier(column)?, params.push(value.clone()))))
        .collect::<Result<Vec<_>, DbError>>()?;
    let conditions = where_clause(filter, &mut params)?;

    Ok(SqlStatement {
        sql: format!(
            "UPDATE {} SET {} WHERE {}{}",
            table,
            assignments.join(", "),
            conditions,
            returning_clause(returning)?
        ),
        params: params.values,
    })
}

/// `DELETE FROM t WHERE ...`
pub fn build_delete(table: &str, filter: &Filter) -> Result<SqlStatement, DbError> {
    let table = identifier(table)?;
    require_filter(filter, "delete")?;

    let mut params = Params::default();
    let conditions = where_clause(filter, &mut params)?;

    Ok(SqlStatement {
        sql: format!("DELETE FROM {} WHERE {}", table, conditions),
        params: params.values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use partner_store::OrderBy;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    /// Placeholder numbers in order of appearance
    fn placeholders(sql: &str) -> Vec<usize> {
        sql.split('$')
            .skip(1)
            .map(|rest| {
                rest.chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>()
                    .parse()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_update_support_action_rating() {
        let stmt = build_update(
            "support_actions",
            &row(json!({"effectiveness_rating": 5})),
            &Filter::new().eq("id", "a1"),
            &Returning::Nothing,
        )
        .unwrap();

        assert_eq!(
            stmt.sql,
            "UPDATE support_actions SET effectiveness_rating = $1 WHERE id = $2"
        );
        assert_eq!(stmt.params, vec![json!(5), json!("a1")]);
    }

    #[test]
    fn test_update_where_placeholders_follow_set() {
        for n in 1..=5 {
            for m in 1..=4 {
                let patch: Row = (0..n).map(|i| (format!("c{}", i), json!(i))).collect();
                let filter = (0..m).fold(Filter::new(), |f, i| f.eq(format!("w{}", i), i));

                let stmt = build_update("t", &patch, &filter, &Returning::All).unwrap();
                let numbers = placeholders(&stmt.sql);

                assert_eq!(numbers, (1..=n + m).collect::<Vec<_>>());
                let where_part = stmt.sql.split(" WHERE ").nth(1).unwrap();
                assert_eq!(placeholders(where_part).first(), Some(&(n + 1)));
                assert_eq!(stmt.params.len(), n + m);
            }
        }
    }

    #[test]
    fn test_null_conditions_consume_no_placeholder() {
        let stmt = build_update(
            "crisis_situations",
            &row(json!({"follow_up_required": false, "resolution_notes": "ok"})),
            &Filter::new().eq("id", "c1").is_null("resolved_at").eq("user_id", "u1"),
            &Returning::All,
        )
        .unwrap();

        assert_eq!(
            stmt.sql,
            "UPDATE crisis_situations SET follow_up_required = $1, resolution_notes = $2 \
             WHERE id = $3 AND resolved_at IS NULL AND user_id = $4 RETURNING *"
        );
        assert_eq!(stmt.params.len(), 4);
    }

    #[test]
    fn test_insert_with_returning() {
        let stmt = build_insert(
            "daily_checkins",
            &row(json!({"user_id": "u1", "checkin_date": "2024-03-01", "notes": null})),
            &Returning::Columns(vec!["id".into(), "created_at".into()]),
        )
        .unwrap();

        assert_eq!(
            stmt.sql,
            "INSERT INTO daily_checkins (user_id, checkin_date, notes) VALUES ($1, $2, $3) \
             RETURNING id, created_at"
        );
        assert_eq!(stmt.params, vec![json!("u1"), json!("2024-03-01"), Value::Null]);
    }

    #[test]
    fn test_insert_empty_row_uses_defaults() {
        let stmt = build_insert("audit_logs", &Row::new(), &Returning::All).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO audit_logs DEFAULT VALUES RETURNING *");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_select_full_envelope() {
        let options = SelectOptions::new()
            .columns(["session_id", "created_at"])
            .filter(Filter::new().eq("user_id", "u1").eq("session_id", "s1"))
            .order_by(OrderBy::desc("created_at"))
            .limit(50)
            .offset(100);

        let stmt = build_select("mama_grace_conversations", &options).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT session_id, created_at FROM mama_grace_conversations \
             WHERE user_id = $1 AND session_id = $2 ORDER BY created_at DESC LIMIT 50 OFFSET 100"
        );
        assert_eq!(stmt.params, vec![json!("u1"), json!("s1")]);
    }

    #[test]
    fn test_select_defaults() {
        let stmt = build_select("support_actions", &SelectOptions::new()).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM support_actions");
        assert!(stmt.params.is_empty());

        let stmt = build_select(
            "support_actions",
            &SelectOptions::new().order_by(OrderBy::asc("logged_at")),
        )
        .unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM support_actions ORDER BY logged_at ASC");
    }

    #[test]
    fn test_delete() {
        let stmt = build_delete("partner_connections", &Filter::new().eq("id", "p1")).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM partner_connections WHERE id = $1");
        assert_eq!(stmt.params, vec![json!("p1")]);
    }

    #[test]
    fn test_unfiltered_writes_are_refused() {
        let patch = row(json!({"is_read": true}));
        assert!(matches!(
            build_update("ai_insights", &patch, &Filter::new(), &Returning::Nothing),
            Err(DbError::InvalidQuery(_))
        ));
        assert!(matches!(
            build_delete("ai_insights", &Filter::new()),
            Err(DbError::InvalidQuery(_))
        ));
        assert!(matches!(
            build_update("ai_insights", &Row::new(), &Filter::new().eq("id", "i1"), &Returning::Nothing),
            Err(DbError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_identifiers_are_checked() {
        assert!(matches!(
            build_select("users; DROP TABLE x", &SelectOptions::new()),
            Err(DbError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            build_insert("t", &row(json!({"a b": 1})), &Returning::Nothing),
            Err(DbError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            build_select("t", &SelectOptions::new().order_by(OrderBy::asc("x--"))),
            Err(DbError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            build_delete("t", &Filter::new().eq("1=1 OR id", 1)),
            Err(DbError::InvalidIdentifier(_))
        ));
    }
}
