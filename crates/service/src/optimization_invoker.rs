use std::sync::Arc;

use ecotoken_core::StatementTarget;
use ecotoken_core::constants::OPTIMIZE_PROCEDURE;
use ecotoken_warehouse::{Bindings, StatementExecutor, StatementResult};
use serde_json::{Map, Value};

use crate::error::ServiceError;

/// Calls the optimize procedure and unwraps its single result value.
pub struct OptimizationInvoker {
    executor: Arc<dyn StatementExecutor>,
    procedure: String,
}

impl OptimizationInvoker {
    #[must_use]
    pub fn new(executor: Arc<dyn StatementExecutor>, target: &StatementTarget) -> Self {
        Self { executor, procedure: target.qualify(OPTIMIZE_PROCEDURE) }
    }

    /// `Ok(None)` means the procedure returned nothing usable.
    ///
    /// # Errors
    /// Returns an error for an empty tag or when the remote call fails.
    pub async fn optimize(
        &self,
        tag: &str,
        filter_or_text: Option<&str>,
        model: Option<&str>,
    ) -> Result<Option<Value>, ServiceError> {
        if tag.is_empty() {
            return Err(ServiceError::InvalidInput("tag must not be empty".to_owned()));
        }

        let statement = format!("CALL {}(?, ?, ?)", self.procedure);
        let bindings = Bindings::text([Some(tag), filter_or_text, model]);
        let envelope = self.executor.execute(&statement, &bindings).await?;

        let has_rowset = envelope.get("rowset").is_some_and(Value::is_array);
        let has_data = envelope.get("data").is_some_and(Value::is_array);
        tracing::info!(tag, has_rowset, has_data, "optimize call done");
        Ok(unwrap_outcome(&StatementResult::from_envelope(&envelope)))
    }
}

/// Reduces a procedure result to the value it carries.
///
/// - row-set: a one-cell first row yields that cell; wider rows become an
///   object keyed by lower-cased column name (or index). A row that is not
///   an array has no cells and yields an empty object.
/// - data: the first cell of the first row, or the row itself if it is not an array.
///
/// String cells are JSON-decoded when they hold JSON. A JSON `null` result is `None`.
#[must_use]
pub fn unwrap_outcome(result: &StatementResult) -> Option<Value> {
    let outcome = match result {
        StatementResult::RowSet { columns, rows } => rows.first().map(|row| unwrap_row(columns, row)),
        StatementResult::Data { rows } => rows.first().and_then(|row| match row {
            Value::Array(cells) => cells.first().map(parse_cell),
            other => Some(other.clone()),
        }),
        StatementResult::Empty => None,
    };
    outcome.filter(|value| !value.is_null())
}

fn unwrap_row(columns: &[Option<String>], row: &Value) -> Value {
    match row.as_array().map(Vec::as_slice) {
        Some([only]) => parse_cell(only),
        Some(cells) => {
            let fields: Map<String, Value> = cells
                .iter()
                .enumerate()
                .map(|(index, cell)| (column_key(columns, index), parse_cell(cell)))
                .collect();
            Value::Object(fields)
        },
        None => Value::Object(Map::new()),
    }
}

fn column_key(columns: &[Option<String>], index: usize) -> String {
    columns
        .get(index)
        .and_then(Option::as_deref)
        .filter(|name| !name.is_empty())
        .map_or_else(|| index.to_string(), ToOwned::to_owned)
}

fn parse_cell(cell: &Value) -> Value {
    match cell {
        Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| cell.clone()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{FakeExecutor, remote_error, target};

    fn unwrap(envelope: Value) -> Option<Value> {
        unwrap_outcome(&StatementResult::from_envelope(&envelope))
    }

    #[test]
    fn test_single_plain_string_cell() {
        assert_eq!(unwrap(json!({"rowset": [["hello"]]})), Some(json!("hello")));
    }

    #[test]
    fn test_single_json_cell_is_decoded() {
        let envelope = json!({
            "rowset": [[r#"{"optimized_text":"short","estimated_tokens_saved":12}"#]]
        });
        assert_eq!(
            unwrap(envelope),
            Some(json!({"optimized_text": "short", "estimated_tokens_saved": 12}))
        );
    }

    #[test]
    fn test_multiple_cells_zip_with_columns() {
        let envelope = json!({
            "resultSetMetaData": {"rowType": [
                {"name": "OPTIMIZED_TEXT"},
                {"name": "ESTIMATED_TOKENS_SAVED"}
            ]},
            "rowset": [["opt text", 42]]
        });
        assert_eq!(
            unwrap(envelope),
            Some(json!({"optimized_text": "opt text", "estimated_tokens_saved": 42}))
        );
    }

    #[test]
    fn test_missing_column_names_use_index() {
        let envelope = json!({
            "resultSetMetaData": {"rowType": [{"name": "MODEL"}]},
            "rowset": [["llama3", "7", null]]
        });
        assert_eq!(unwrap(envelope), Some(json!({"model": "llama3", "1": 7, "2": null})));
    }

    #[test]
    fn test_zero_cell_row_is_empty_object() {
        assert_eq!(unwrap(json!({"rowset": [[]]})), Some(json!({})));
    }

    #[test]
    fn test_non_array_rowset_row_is_empty_object() {
        assert_eq!(unwrap(json!({"rowset": [{"optimized_text": "x"}]})), Some(json!({})));
        assert_eq!(unwrap(json!({"rowset": [42]})), Some(json!({})));
    }

    #[test]
    fn test_data_array_first_cell() {
        let envelope = json!({"data": [[r#"{"optimized_text":"x"}"#, "ignored"]]});
        assert_eq!(unwrap(envelope), Some(json!({"optimized_text": "x"})));
    }

    #[test]
    fn test_data_non_array_row_is_used_directly() {
        assert_eq!(
            unwrap(json!({"data": [{"optimized_text": "x"}]})),
            Some(json!({"optimized_text": "x"}))
        );
    }

    #[test]
    fn test_no_result_shapes() {
        assert_eq!(unwrap(json!({})), None);
        assert_eq!(unwrap(json!({"rowset": []})), None);
        assert_eq!(unwrap(json!({"data": [[]]})), None);
        assert_eq!(unwrap(json!({"rowset": [[null]]})), None);
        assert_eq!(unwrap(json!({"data": [["null"]]})), None);
    }

    #[test]
    fn test_invalid_json_string_kept_literal() {
        assert_eq!(unwrap(json!({"data": [["{not json"]]})), Some(json!("{not json")));
    }

    #[tokio::test]
    async fn test_optimize_binds_three_positions() {
        let executor = FakeExecutor::new(|_| Ok(json!({"data": [["\"done\""]]})));
        let invoker = OptimizationInvoker::new(executor.clone(), &target());

        let outcome = invoker.optimize("tag-1", Some("raw prompt"), None).await.unwrap();
        assert_eq!(outcome, Some(json!("done")));

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "CALL ECOTOKEN_DB.CORE.OPTIMIZE(?, ?, ?)");
        assert_eq!(calls[0].1.len(), 3);
        assert_eq!(calls[0].1.text_at(1), Some("tag-1"));
        assert_eq!(calls[0].1.text_at(2), Some("raw prompt"));
        assert_eq!(calls[0].1.text_at(3), None);
    }

    #[tokio::test]
    async fn test_optimize_propagates_remote_failure() {
        let executor = FakeExecutor::new(|_| Err(remote_error(500, "procedure failed")));
        let invoker = OptimizationInvoker::new(executor, &target());
        let err = invoker.optimize("t", None, None).await.unwrap_err();
        assert!(err.to_string().contains("procedure failed"));
    }

    #[tokio::test]
    async fn test_optimize_rejects_empty_tag() {
        let executor = FakeExecutor::new(|_| Ok(json!({})));
        let invoker = OptimizationInvoker::new(executor.clone(), &target());
        assert!(matches!(
            invoker.optimize("", None, None).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(executor.calls().is_empty());
    }
}
