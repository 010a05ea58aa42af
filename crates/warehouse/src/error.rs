//! Typed error enum for the warehouse crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from token signing and statement execution.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("failed to read private key {}: {source}", .path.display())]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("private key is encrypted but no passphrase is configured")]
    MissingPassphrase,
    #[error("failed to decrypt private key: {0}")]
    KeyDecrypt(String),
    #[error("JWT signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    /// Non-success status from the statements endpoint; `body` is verbatim.
    #[error("statement execution failed with HTTP {status}: {body}")]
    RemoteExecution { status: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl WarehouseError {
    /// Whether the failure came from the local key material rather than the remote side.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::KeyRead { .. } | Self::MissingPassphrase | Self::KeyDecrypt(_) | Self::Signing(_)
        )
    }
}
