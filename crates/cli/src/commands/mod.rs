pub mod chat;
pub mod history;
pub mod init;
pub mod serve;

use concierge_agent::SessionOrchestrator;
use concierge_config::AppConfig;

/// Open the stores, build the provider and wire the orchestrator.
pub async fn build(config: &AppConfig) -> Result<SessionOrchestrator, Box<dyn std::error::Error>> {
    let stores = concierge_agent::open_stores(config).await?;

    let provider = concierge_providers::build_from_config(config).inspect_err(|_| {
        if !config.has_api_key() {
            print_missing_key_help();
        }
    })?;
    let model = concierge_providers::resolve_model(config);
    tracing::debug!(provider = provider.name(), model = %model, "Provider ready");

    Ok(concierge_agent::build_orchestrator(
        config, stores, provider, &model,
    ))
}

fn print_missing_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    CONCIERGE_API_KEY   = 'sk-...'        (generic)");
    eprintln!("    OPENAI_API_KEY      = 'sk-...'        (for OpenAI direct)");
    eprintln!("    OPENROUTER_API_KEY  = 'sk-or-v1-...'  (with CONCIERGE_PROVIDER=openrouter)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}
