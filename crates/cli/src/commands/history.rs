//! `concierge history` and `concierge clear`: Inspect or delete a session.

use concierge_config::AppConfig;
use concierge_core::history::HistoryStore;

pub async fn show(session_id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let stores = concierge_agent::open_stores(&config).await?;
    let messages = stores.history.list(session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("No messages for session {session_id}");
        return Ok(());
    }

    println!("Session {session_id} ({} messages)\n", messages.len());
    for m in &messages {
        println!(
            "  [{}] {:<9} {}",
            m.timestamp.format("%Y-%m-%d %H:%M:%S"),
            m.role.as_str(),
            m.content
        );
    }

    Ok(())
}

pub async fn clear(session_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let stores = concierge_agent::open_stores(&config).await?;
    let deleted = stores.history.clear(session_id).await?;

    println!("🗑️  Cleared {deleted} messages from session {session_id}");
    Ok(())
}
