//! Service layer for the EcoToken relay
//!
//! Sequences the warehouse calls behind one optimize request. Telemetry
//! writers report success as a `bool` and never fail the request.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod error;
mod optimization_invoker;
mod relay_service;
mod sample_logger;
mod stats_logger;
#[cfg(test)]
mod test_support;

pub use error::ServiceError;
pub use optimization_invoker::{OptimizationInvoker, unwrap_outcome};
pub use relay_service::RelayService;
pub use sample_logger::SampleLogger;
pub use stats_logger::StatsLogger;
