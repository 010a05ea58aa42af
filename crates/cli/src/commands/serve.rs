use std::sync::Arc;

use anyhow::Result;
use ecotoken_core::RelayConfig;
use ecotoken_http::{AppState, CorsPolicy, create_router};
use ecotoken_service::RelayService;
use ecotoken_warehouse::SqlApiClient;

pub(crate) async fn run(config: &RelayConfig, port: Option<u16>, host: String) -> Result<()> {
    tracing::debug!(?config, "loaded relay configuration");

    let client = Arc::new(SqlApiClient::from_config(config)?);
    tracing::info!(endpoint = %client.endpoint(), "SQL API client ready");

    let relay = Arc::new(RelayService::new(client, &config.target, &config.log_schema));
    let state = Arc::new(AppState { relay, cors: CorsPolicy::from_config(config) });
    if !config.production {
        tracing::info!("non-production mode: any request origin is echoed");
    }

    let router = create_router(state);
    let addr = format!("{host}:{}", port.unwrap_or(config.port));
    tracing::info!("Starting EcoToken relay on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
