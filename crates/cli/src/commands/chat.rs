//! `concierge chat`: Interactive or single-message chat mode.

use concierge_agent::{SessionOrchestrator, TurnOutcome};
use concierge_config::AppConfig;
use concierge_core::message::SessionId;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    session: Option<String>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = super::build(&config).await?;

    // Keep one session for the whole REPL even when none was given.
    let session_id = SessionId::resolve(session.as_deref());

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let outcome = orchestrator.submit_turn(Some(session_id.as_str()), &msg).await;
        eprint!("\r              \r");
        print_outcome(&outcome);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Concierge — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", concierge_providers::resolve_model(&config));
    println!("  History:   {}", orchestrator.history_backend());
    println!("  Session:   {session_id}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'salir' or 'exit' to quit.");
    println!();

    repl(&orchestrator, &session_id).await?;

    println!();
    println!("  ¡Hasta luego! 👋");
    println!();

    Ok(())
}

async fn repl(
    orchestrator: &SessionOrchestrator,
    session_id: &SessionId,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit(input) {
            break;
        }

        eprint!("  ...");
        let outcome = orchestrator.submit_turn(Some(session_id.as_str()), input).await;
        eprint!("\r     \r");
        println!();
        print_outcome(&outcome);
        println!();
    }

    Ok(())
}

fn is_exit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "salir" | "exit" | "quit")
}

fn print_outcome(outcome: &TurnOutcome) {
    for line in outcome.reply.lines() {
        println!("  Concierge > {line}");
    }
    println!("  [intent: {}]", outcome.intent.as_str());
}
