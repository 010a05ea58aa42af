//! Shared constants for the EcoToken relay.
//!
//! Object names and defaults that must agree between the relay and the
//! objects deployed in the warehouse.

/// Default listen port when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 3000;

/// Default schema holding the prompt sample table.
pub const DEFAULT_LOG_SCHEMA: &str = "ECOTOKEN";

/// Default private key location, relative to the working directory.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "./rsa_key.p8";

/// Statement timeout passed to the SQL API, in seconds.
pub const STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Lifetime of a key-pair JWT, in seconds (59 minutes; the API caps it at one hour).
pub const TOKEN_LIFETIME_SECS: i64 = 59 * 60;

/// Table receiving raw prompt samples.
pub const PROMPT_SAMPLE_TABLE: &str = "PROMPT_TUNING";

/// Timestamp column candidates for the prompt sample table, tried in order.
pub const PROMPT_SAMPLE_TIMESTAMP_COLUMNS: [&str; 2] = ["CREATED_AT", "created_ts"];

/// Stored procedure producing the optimized prompt.
pub const OPTIMIZE_PROCEDURE: &str = "OPTIMIZE";

/// Stored procedure recording token statistics.
pub const LOG_STATS_PROCEDURE: &str = "LOG_STATS_TEST";

/// Origin of the local dashboard dev server, always CORS-allowed.
pub const DEV_DASHBOARD_ORIGIN: &str = "http://localhost:3001";

/// Value of the environment marker that enables strict CORS.
pub const PRODUCTION_ENV: &str = "production";
