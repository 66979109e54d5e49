//! `concierge serve`: Start the HTTP API server.

use concierge_config::AppConfig;
use std::sync::Arc;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let orchestrator = super::build(&config).await?;

    println!("🛎️  Concierge Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   History:   {}", orchestrator.history_backend());

    concierge_gateway::start(&config, Arc::new(orchestrator)).await?;

    Ok(())
}
