//! Uniform result envelope

use partner_store::{Row, StoreOutput};

use crate::error::RouterError;
use crate::router::RoutingDecision;

/// Result of a routed operation
///
/// Store failures are captured in `error` with `data` left empty; they are
/// never propagated past the router.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub data: Vec<Row>,
    pub error: Option<RouterError>,
    pub count: Option<u64>,
    /// How the call was routed; `None` when no store was called
    pub decision: Option<RoutingDecision>,
}

impl QueryResult {
    pub fn ok(output: StoreOutput, decision: RoutingDecision) -> Self {
        Self {
            data: output.rows,
            error: None,
            count: output.count,
            decision: Some(decision),
        }
    }

    /// A successful empty result for a read that needed no store call
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            error: None,
            count: Some(0),
            decision: None,
        }
    }

    pub fn failed(error: RouterError, decision: Option<RoutingDecision>) -> Self {
        Self {
            data: Vec::new(),
            error: Some(error),
            count: None,
            decision,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// First returned row, if any
    pub fn first(&self) -> Option<&Row> {
        self.data.first()
    }

    /// Take the first row, or the captured error
    pub fn into_first(self) -> Result<Option<Row>, RouterError> {
        self.into_result().map(|rows| rows.into_iter().next())
    }

    /// Take the rows, or the captured error
    pub fn into_result(self) -> Result<Vec<Row>, RouterError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partner_store::StoreKind;
    use serde_json::json;

    #[test]
    fn test_envelope_accessors() {
        let row = json!({"id": "u1"}).as_object().cloned().unwrap();
        let result = QueryResult::ok(
            StoreOutput::rows(vec![row.clone()]),
            RoutingDecision::RoutedTo {
                store: StoreKind::Hosted,
            },
        );

        assert!(result.is_ok());
        assert_eq!(result.count, Some(1));
        assert_eq!(result.first(), Some(&row));
        assert_eq!(result.into_first().unwrap(), Some(row));
    }

    #[test]
    fn test_failed_envelope_is_empty() {
        let result = QueryResult::failed(RouterError::UnknownTable("nope".into()), None);
        assert!(!result.is_ok());
        assert!(result.data.is_empty());
        assert_eq!(result.count, None);
        assert_eq!(
            result.into_result(),
            Err(RouterError::UnknownTable("nope".into()))
        );
    }
}
