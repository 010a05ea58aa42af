use std::sync::Arc;

use ecotoken_core::{OptimizeRequest, StatementTarget};
use ecotoken_warehouse::StatementExecutor;
use serde_json::Value;

use crate::error::ServiceError;
use crate::optimization_invoker::OptimizationInvoker;
use crate::sample_logger::SampleLogger;
use crate::stats_logger::StatsLogger;

/// Runs one optimize request: sample write, procedure call, stats write.
///
/// Only the procedure call can fail the request.
pub struct RelayService {
    samples: SampleLogger,
    invoker: OptimizationInvoker,
    stats: StatsLogger,
}

impl RelayService {
    #[must_use]
    pub fn new(executor: Arc<dyn StatementExecutor>, target: &StatementTarget, log_schema: &str) -> Self {
        Self {
            samples: SampleLogger::new(Arc::clone(&executor), target, log_schema),
            invoker: OptimizationInvoker::new(Arc::clone(&executor), target),
            stats: StatsLogger::new(executor, target),
        }
    }

    /// `Ok(None)` when the procedure produced no result.
    ///
    /// # Errors
    /// Returns an error when the optimize procedure call fails.
    pub async fn handle(&self, request: &OptimizeRequest) -> Result<Option<Value>, ServiceError> {
        tracing::info!(
            tag = %request.tag,
            raw_text_len = request.raw_text.as_deref().map_or(0, str::len),
            "optimize request"
        );

        self.samples.log_sample(&request.tag, request.raw_text.as_deref()).await;

        let outcome = self
            .invoker
            .optimize(&request.tag, request.procedure_input(), request.model.as_deref())
            .await?;

        if outcome.as_ref().is_some_and(Value::is_object) {
            self.stats.log_stats(&request.tag, outcome.as_ref()).await;
        }

        let outcome = outcome.filter(|value| !is_falsy(value));
        if outcome.is_none() {
            tracing::warn!(tag = %request.tag, "optimize returned empty");
        }
        Ok(outcome)
    }
}

/// `false`, `0` and `""` carry no outcome, same as `null`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
