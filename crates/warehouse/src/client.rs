use async_trait::async_trait;
use ecotoken_core::constants::STATEMENT_TIMEOUT_SECS;
use ecotoken_core::{RelayConfig, StatementTarget};
use serde::Serialize;
use serde_json::Value;

use crate::bindings::Bindings;
use crate::error::WarehouseError;
use crate::signer::KeyPairSigner;

/// Header telling the SQL API which kind of bearer token is presented.
pub const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";
/// Token type value for key-pair JWTs.
pub const KEYPAIR_JWT: &str = "KEYPAIR_JWT";

/// Executes one SQL statement remotely and returns the raw response envelope.
///
/// The envelope is returned unvalidated; see [`crate::StatementResult`] for
/// shape handling.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, statement: &str, bindings: &Bindings) -> Result<Value, WarehouseError>;
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    #[serde(flatten)]
    target: &'a StatementTarget,
    timeout: u64,
    bindings: &'a Bindings,
}

/// Client for the `/api/v2/statements` endpoint.
///
/// Every call mints a fresh token; nothing is cached between calls.
#[derive(Debug)]
pub struct SqlApiClient {
    client: reqwest::Client,
    endpoint: String,
    target: StatementTarget,
    signer: KeyPairSigner,
}

impl SqlApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(
        endpoint: impl Into<String>,
        target: StatementTarget,
        signer: KeyPairSigner,
    ) -> Result<Self, WarehouseError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ecotoken-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WarehouseError::ClientInit(e.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into(), target, signer })
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &RelayConfig) -> Result<Self, WarehouseError> {
        let signer = KeyPairSigner::new(
            config.identity.clone(),
            config.private_key_path.clone(),
            config.private_key_passphrase.clone(),
        );
        Self::new(config.endpoint.clone(), config.target.clone(), signer)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatementExecutor for SqlApiClient {
    async fn execute(&self, statement: &str, bindings: &Bindings) -> Result<Value, WarehouseError> {
        let binding_count = bindings.len();
        tracing::debug!(binding_count, "executing statement");
        let token = self.signer.mint()?;
        let payload = StatementRequest {
            statement,
            target: &self.target,
            timeout: STATEMENT_TIMEOUT_SECS,
            bindings,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(TOKEN_TYPE_HEADER, KEYPAIR_JWT)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body_len = body.len(), "statement rejected");
            return Err(WarehouseError::RemoteExecution { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|e| WarehouseError::JsonParse {
            context: format!("statement response (body: {})", truncate(&body, 200)),
            source: e,
        })
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
