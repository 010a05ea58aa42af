//! In-memory statement executor for service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ecotoken_core::StatementTarget;
use ecotoken_warehouse::{Bindings, StatementExecutor, WarehouseError};
use serde_json::Value;

type Responder = dyn Fn(&str) -> Result<Value, WarehouseError> + Send + Sync;

pub(crate) struct FakeExecutor {
    responder: Box<Responder>,
    calls: Mutex<Vec<(String, Bindings)>>,
}

impl FakeExecutor {
    pub(crate) fn new(
        responder: impl Fn(&str) -> Result<Value, WarehouseError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self { responder: Box::new(responder), calls: Mutex::new(Vec::new()) })
    }

    pub(crate) fn calls(&self) -> Vec<(String, Bindings)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatementExecutor for FakeExecutor {
    async fn execute(&self, statement: &str, bindings: &Bindings) -> Result<Value, WarehouseError> {
        self.calls.lock().unwrap().push((statement.to_owned(), bindings.clone()));
        (self.responder)(statement)
    }
}

pub(crate) fn remote_error(status: u16, body: &str) -> WarehouseError {
    WarehouseError::RemoteExecution { status, body: body.to_owned() }
}

pub(crate) fn target() -> StatementTarget {
    StatementTarget {
        warehouse: None,
        database: "ECOTOKEN_DB".to_owned(),
        schema: "CORE".to_owned(),
        role: None,
    }
}
