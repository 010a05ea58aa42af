use std::sync::Arc;

use anyhow::Result;
use ecotoken_core::{OptimizeRequest, RelayConfig};
use ecotoken_http::api_error::NO_RESULT;
use ecotoken_service::RelayService;
use ecotoken_warehouse::SqlApiClient;

pub(crate) async fn run(
    config: &RelayConfig,
    tag: String,
    text: Option<String>,
    filter: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let client = Arc::new(SqlApiClient::from_config(config)?);
    let relay = RelayService::new(client, &config.target, &config.log_schema);

    let request = OptimizeRequest { tag, raw_filter: filter, model, raw_text: text };
    let body = relay
        .handle(&request)
        .await?
        .unwrap_or_else(|| serde_json::json!({"error": NO_RESULT}));
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
