//! Process configuration, loaded once at startup and passed to constructors.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::{
    DEFAULT_LOG_SCHEMA, DEFAULT_PORT, DEFAULT_PRIVATE_KEY_PATH, PRODUCTION_ENV,
};
use crate::env_config::{non_empty, parse_with_default};
use crate::error::ConfigError;

/// Key-pair signing identity registered with the warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account: String,
    pub user: String,
    pub public_key_fingerprint: String,
}

impl Identity {
    #[must_use]
    pub fn new(account: &str, user: &str, public_key_fingerprint: &str) -> Self {
        Self {
            account: account.to_owned(),
            user: user.to_owned(),
            public_key_fingerprint: public_key_fingerprint.to_owned(),
        }
    }

    /// `ACCOUNT.USER`, used as the token subject.
    #[must_use]
    pub fn qualified_user(&self) -> String {
        format!("{}.{}", self.account.to_uppercase(), self.user.to_uppercase())
    }

    /// `ACCOUNT.USER.FINGERPRINT`, used as the token issuer.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("{}.{}", self.qualified_user(), self.public_key_fingerprint)
    }
}

/// Execution context sent with every statement.
///
/// Unset warehouse and role are omitted so the user's defaults apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    pub database: String,
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl StatementTarget {
    /// Fully qualified name of an object in the target schema.
    #[must_use]
    pub fn qualify(&self, object: &str) -> String {
        self.qualify_in(&self.schema, object)
    }

    /// Fully qualified name of an object in another schema of the target database.
    #[must_use]
    pub fn qualify_in(&self, schema: &str, object: &str) -> String {
        format!("{}.{schema}.{object}", self.database)
    }
}

/// Everything the relay reads from its environment.
#[derive(Clone)]
pub struct RelayConfig {
    pub port: u16,
    /// Full URL of the statements endpoint.
    pub endpoint: String,
    pub identity: Identity,
    pub target: StatementTarget,
    /// Schema of the prompt sample table.
    pub log_schema: String,
    pub private_key_path: PathBuf,
    pub private_key_passphrase: Option<String>,
    pub extension_id: Option<String>,
    pub allow_origin: Option<String>,
    /// Strict CORS: only allow-listed origins are echoed.
    pub production: bool,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("port", &self.port)
            .field("endpoint", &self.endpoint)
            .field("identity", &self.identity)
            .field("target", &self.target)
            .field("log_schema", &self.log_schema)
            .field("private_key_path", &self.private_key_path)
            .field("private_key_passphrase", &self.private_key_passphrase.as_ref().map(|_| "***"))
            .field("extension_id", &self.extension_id)
            .field("allow_origin", &self.allow_origin)
            .field("production", &self.production)
            .finish()
    }
}

impl RelayConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when a required variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when a required variable is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |var: &str| non_empty(lookup(var));
        let required = |var: &'static str| optional(var).ok_or(ConfigError::Missing(var));

        let endpoint = match optional("SNOWFLAKE_API_URL") {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => statements_endpoint(&required("SNOWFLAKE_HTTP_ACCOUNT")?)?,
        };

        let identity = Identity {
            account: required("SNOWFLAKE_ACCOUNT")?,
            user: required("SNOWFLAKE_USER")?,
            public_key_fingerprint: required("SNOWFLAKE_PUBLIC_KEY_FP")?,
        };

        let target = StatementTarget {
            warehouse: optional("SNOWFLAKE_WAREHOUSE"),
            database: required("SNOWFLAKE_DATABASE")?,
            schema: required("SNOWFLAKE_SCHEMA")?,
            role: optional("SNOWFLAKE_ROLE"),
        };

        let production = optional("ECOTOKEN_ENV")
            .or_else(|| optional("NODE_ENV"))
            .is_some_and(|env| env.eq_ignore_ascii_case(PRODUCTION_ENV));

        Ok(Self {
            port: parse_with_default("PORT", optional("PORT"), DEFAULT_PORT),
            endpoint,
            identity,
            target,
            log_schema: optional("SNOWFLAKE_LOG_SCHEMA")
                .unwrap_or_else(|| DEFAULT_LOG_SCHEMA.to_owned()),
            private_key_path: PathBuf::from(
                optional("SF_PRIVATE_KEY_PATH")
                    .unwrap_or_else(|| DEFAULT_PRIVATE_KEY_PATH.to_owned()),
            ),
            private_key_passphrase: lookup("SF_PRIVATE_KEY_PASSPHRASE")
                .filter(|p| !p.is_empty()),
            extension_id: optional("EXTENSION_ID"),
            allow_origin: optional("ALLOW_ORIGIN"),
            production,
        })
    }

    /// Anchors a relative private key path at `base`, the directory of the
    /// env file the configuration came from. Absolute paths are kept.
    pub fn resolve_key_path(&mut self, base: &Path) {
        if self.private_key_path.is_relative() {
            self.private_key_path = base.join(&self.private_key_path);
        }
    }
}

fn statements_endpoint(account_host: &str) -> Result<String, ConfigError> {
    if account_host.contains('/') || account_host.contains(':') {
        return Err(ConfigError::Invalid {
            var: "SNOWFLAKE_HTTP_ACCOUNT",
            reason: "expected an account host label, not a URL".to_owned(),
        });
    }
    Ok(format!("https://{account_host}.snowflakecomputing.com/api/v2/statements"))
}
