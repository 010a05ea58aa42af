use std::sync::Arc;

use ecotoken_core::constants::LOG_STATS_PROCEDURE;
use ecotoken_core::{StatementTarget, StatsRecord};
use ecotoken_warehouse::{Bindings, StatementExecutor};
use serde_json::Value;

/// Best-effort writer of per-call token statistics.
pub struct StatsLogger {
    executor: Arc<dyn StatementExecutor>,
    procedure: String,
}

impl StatsLogger {
    #[must_use]
    pub fn new(executor: Arc<dyn StatementExecutor>, target: &StatementTarget) -> Self {
        Self { executor, procedure: target.qualify(LOG_STATS_PROCEDURE) }
    }

    /// Returns whether stats were recorded. Never fails.
    pub async fn log_stats(&self, tag: &str, outcome: Option<&Value>) -> bool {
        let Some(fields) = outcome.and_then(Value::as_object) else {
            return false;
        };
        match StatsRecord::from_outcome(tag, fields) {
            Some(record) => self.log_record(&record).await,
            None => false,
        }
    }

    /// All values are bound as TEXT; the procedure casts them back.
    pub async fn log_record(&self, record: &StatsRecord) -> bool {
        let statement = format!("CALL {}(?, ?, ?, ?, ?)", self.procedure);
        let bindings = Bindings::text([
            Some(record.tag.as_str()),
            record.model.as_deref(),
            record.tokens_before.as_deref(),
            record.tokens_after.as_deref(),
            record.tokens_saved.as_deref(),
        ]);

        match self.executor.execute(&statement, &bindings).await {
            Ok(_) => {
                tracing::info!(
                    procedure = %self.procedure,
                    tag = %record.tag,
                    model = ?record.model,
                    before = ?record.tokens_before,
                    after = ?record.tokens_after,
                    saved = ?record.tokens_saved,
                    "logged optimization stats"
                );
                true
            },
            Err(e) => {
                tracing::warn!(procedure = %self.procedure, error = %e, "stats procedure failed");
                false
            },
        }
    }
}
