//! Core types and configuration for the EcoToken relay
//!
//! This crate contains domain types shared across all other crates.

#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

mod config;
pub mod constants;
pub mod env_config;
mod error;
mod request;
mod stats;

pub use config::*;
pub use error::*;
pub use request::*;
pub use stats::*;
