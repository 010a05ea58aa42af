//! Typed error enum for the service layer.

use ecotoken_warehouse::WarehouseError;
use thiserror::Error;

/// Failures of the authoritative optimize path.
///
/// Telemetry writes never produce one of these; they report a `bool` instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Signing or statement execution failed.
    #[error("warehouse: {0}")]
    Warehouse(#[from] WarehouseError),

    /// Caller provided invalid input (empty tag).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
