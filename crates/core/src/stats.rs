//! Token statistics derived from an optimization outcome.

use serde_json::{Map, Value};

/// Outcome field holding the token estimate before optimization.
pub const TOKENS_BEFORE_FIELD: &str = "estimated_tokens_before";
/// Outcome field holding the token estimate after optimization.
pub const TOKENS_AFTER_FIELD: &str = "estimated_tokens_after";
/// Outcome field holding the tokens saved.
pub const TOKENS_SAVED_FIELD: &str = "estimated_tokens_saved";
/// Outcome field naming the model that produced the rewrite.
pub const MODEL_FIELD: &str = "model";

/// One stats row. Numbers are kept in their textual form so the remote
/// procedure does the numeric coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecord {
    pub tag: String,
    pub model: Option<String>,
    pub tokens_before: Option<String>,
    pub tokens_after: Option<String>,
    pub tokens_saved: Option<String>,
}

impl StatsRecord {
    /// Extracts stats from an outcome object.
    ///
    /// Returns `None` when none of before/after/saved/model carry a value.
    /// `saved` falls back to `before - after` when both are numeric.
    #[must_use]
    pub fn from_outcome(tag: &str, outcome: &Map<String, Value>) -> Option<Self> {
        let before = present(outcome, TOKENS_BEFORE_FIELD);
        let after = present(outcome, TOKENS_AFTER_FIELD);
        let saved = present(outcome, TOKENS_SAVED_FIELD)
            .cloned()
            .or_else(|| before.zip(after).and_then(|(b, a)| difference(b, a)));
        let model = present(outcome, MODEL_FIELD).map(render);

        let model_absent = model.as_deref().is_none_or(str::is_empty);
        if before.is_none() && after.is_none() && saved.is_none() && model_absent {
            return None;
        }

        Some(Self {
            tag: tag.to_owned(),
            model,
            tokens_before: before.map(render),
            tokens_after: after.map(render),
            tokens_saved: saved.as_ref().map(render),
        })
    }
}

fn present<'a>(outcome: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    outcome.get(field).filter(|v| !v.is_null())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn difference(before: &Value, after: &Value) -> Option<Value> {
    if let (Some(b), Some(a)) = (before.as_i64(), after.as_i64()) {
        return b.checked_sub(a).map(Value::from);
    }
    let diff = as_number(before)? - as_number(after)?;
    if diff.fract() == 0.0 && diff.abs() < 9.0e15 {
        #[allow(clippy::cast_possible_truncation, reason = "integral and within i64 range")]
        return Some(Value::from(diff as i64));
    }
    serde_json::Number::from_f64(diff).map(Value::Number)
}
