use std::sync::Arc;

use ecotoken_core::StatementTarget;
use ecotoken_core::constants::{PROMPT_SAMPLE_TABLE, PROMPT_SAMPLE_TIMESTAMP_COLUMNS};
use ecotoken_warehouse::{Bindings, StatementExecutor};

/// Best-effort writer of raw prompt samples.
///
/// Deployed tables name the timestamp column either `CREATED_AT` or
/// `created_ts`; both are tried in that order.
pub struct SampleLogger {
    executor: Arc<dyn StatementExecutor>,
    table: String,
}

impl SampleLogger {
    #[must_use]
    pub fn new(executor: Arc<dyn StatementExecutor>, target: &StatementTarget, log_schema: &str) -> Self {
        Self { executor, table: target.qualify_in(log_schema, PROMPT_SAMPLE_TABLE) }
    }

    /// Returns whether a row was written. Never fails.
    pub async fn log_sample(&self, tag: &str, raw_text: Option<&str>) -> bool {
        let Some(raw_text) = raw_text.filter(|text| !text.is_empty()) else {
            return false;
        };
        let bindings = Bindings::text([Some(tag), Some(raw_text)]);

        for ts_column in PROMPT_SAMPLE_TIMESTAMP_COLUMNS {
            let statement = format!(
                "INSERT INTO {} (tag, raw_sample, {ts_column}) VALUES (?, ?, CURRENT_TIMESTAMP())",
                self.table
            );
            match self.executor.execute(&statement, &bindings).await {
                Ok(_) => {
                    tracing::info!(
                        table = %self.table,
                        ts_column,
                        tag,
                        text_len = raw_text.len(),
                        "inserted prompt sample"
                    );
                    return true;
                },
                Err(e) => {
                    tracing::error!(table = %self.table, ts_column, error = %e, "prompt sample insert failed");
                },
            }
        }
        false
    }
}
