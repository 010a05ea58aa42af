//! Snowflake SQL API access for the EcoToken relay.
//!
//! Key-pair JWT minting, positional bindings, statement execution, and
//! classification of the response envelope.

#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]

pub mod bindings;
pub mod client;
pub mod error;
pub mod result;
pub mod signer;

pub use bindings::{Binding, BindingType, Bindings};
pub use client::{KEYPAIR_JWT, SqlApiClient, StatementExecutor, TOKEN_TYPE_HEADER};
pub use error::WarehouseError;
pub use result::StatementResult;
pub use signer::{Claims, KeyPairSigner};
