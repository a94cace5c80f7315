//! Generic query envelope
//!
//! These types describe a query independently of the store that runs it.
//! The hosted adapter turns them into PostgREST query parameters and the
//! relational adapter turns them into parameterized SQL.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row as exchanged with either store: column name to JSON value
pub type Row = serde_json::Map<String, Value>;

/// Default window used when an offset is given without a limit
pub const DEFAULT_PAGE_WINDOW: u64 = 100;

/// A single filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Eq { column: String, value: Value },
    /// `column IS NULL`
    IsNull { column: String },
}

impl Condition {
    pub fn column(&self) -> &str {
        match self {
            Condition::Eq { column, .. } | Condition::IsNull { column } => column,
        }
    }
}

/// Conjunction of conditions (`a = 1 AND b IS NULL`)
///
/// Only equality and null tests can be expressed. A JSON null passed to
/// [`Filter::eq`] becomes an `IsNull` condition, since `= NULL` never
/// matches in either store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        match value.into() {
            Value::Null => self.conditions.push(Condition::IsNull { column }),
            value => self.conditions.push(Condition::Eq { column, value }),
        }
        self
    }

    /// Add a null test
    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.conditions.push(Condition::IsNull {
            column: column.into(),
        });
        self
    }

    /// Build a filter from a `where` object, one condition per key
    pub fn from_row(row: &Row) -> Self {
        row.iter()
            .fold(Self::new(), |filter, (column, value)| {
                filter.eq(column.clone(), value.clone())
            })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Check whether a row satisfies every condition
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq { column, value } => row.get(column) == Some(value),
            Condition::IsNull { column } => row.get(column).is_none_or(Value::is_null),
        })
    }
}

/// Single-column ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Columns a write should hand back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Returning {
    #[default]
    Nothing,
    All,
    Columns(Vec<String>),
}

impl Returning {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Returning::Nothing)
    }

    /// Projection list, `None` when nothing is returned
    pub fn projection(&self) -> Option<Vec<&str>> {
        match self {
            Returning::Nothing => None,
            Returning::All => Some(vec!["*"]),
            Returning::Columns(columns) => Some(columns.iter().map(String::as_str).collect()),
        }
    }
}

/// Options for a select
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub columns: Option<Vec<String>>,
    pub filter: Filter,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Limit to apply, widening to the default window when only an
    /// offset was requested
    pub fn effective_limit(&self) -> Option<u64> {
        match (self.limit, self.offset) {
            (Some(limit), _) => Some(limit),
            (None, Some(_)) => Some(DEFAULT_PAGE_WINDOW),
            (None, None) => None,
        }
    }
}

/// Check that a name is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`)
///
/// Table and column names end up inside SQL text and URL paths, so
/// anything else is refused before reaching a store.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
