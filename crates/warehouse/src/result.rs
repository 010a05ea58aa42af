//! Shape classification of SQL API response envelopes.
//!
//! The statements endpoint is not consistent about where rows live: some
//! responses carry a `rowset`, others a `data` array. Classification never
//! fails; anything unrecognised is [`StatementResult::Empty`].

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum StatementResult {
    /// Non-empty `rowset`. `columns[i]` is the lower-cased name of column `i`, if reported.
    RowSet { columns: Vec<Option<String>>, rows: Vec<Value> },
    /// Non-empty `data` array.
    Data { rows: Vec<Value> },
    Empty,
}

impl StatementResult {
    /// Classifies an envelope. `rowset` wins over `data` when both are present.
    #[must_use]
    pub fn from_envelope(envelope: &Value) -> Self {
        if let Some(rows) = non_empty_array(envelope, "rowset") {
            return Self::RowSet { columns: column_names(envelope), rows: rows.to_vec() };
        }
        if let Some(rows) = non_empty_array(envelope, "data") {
            return Self::Data { rows: rows.to_vec() };
        }
        Self::Empty
    }
}

fn non_empty_array<'a>(envelope: &'a Value, key: &str) -> Option<&'a [Value]> {
    envelope.get(key)?.as_array().map(Vec::as_slice).filter(|rows| !rows.is_empty())
}

fn column_names(envelope: &Value) -> Vec<Option<String>> {
    envelope
        .pointer("/resultSetMetaData/rowType")
        .and_then(Value::as_array)
        .map(|columns| {
            columns
                .iter()
                .map(|column| column.get("name").and_then(Value::as_str).map(str::to_lowercase))
                .collect()
        })
        .unwrap_or_default()
}
