//! Wiring from configuration to a ready orchestrator.

use concierge_config::AppConfig;
use concierge_core::customer::CustomerStore;
use concierge_core::error::StorageError;
use concierge_core::history::HistoryStore;
use concierge_core::intent::Capability;
use concierge_core::provider::Provider;
use concierge_memory::{InMemoryCustomers, InMemoryHistory, SqliteCustomers, SqliteHistory};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::classifier::IntentClassifier;
use crate::dispatcher::Dispatcher;
use crate::enricher::ContextEnricher;
use crate::orchestrator::SessionOrchestrator;
use crate::tool_agent::ToolAgent;

/// History and customer stores.
pub struct Stores {
    pub history: Arc<dyn HistoryStore>,
    pub customers: Arc<dyn CustomerStore>,
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            history: Arc::new(InMemoryHistory::new()),
            customers: Arc::new(InMemoryCustomers::new()),
        }
    }
}

/// Open the stores selected by `history.backend`. SQLite stores share one
/// database file.
pub async fn open_stores(config: &AppConfig) -> Result<Stores, StorageError> {
    match config.history.backend.as_str() {
        "memory" => {
            info!("Using in-memory history (not persisted)");
            Ok(Stores::in_memory())
        }
        _ => {
            let path = config.history.database_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Storage(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
            let pool = concierge_memory::open_pool(&path.to_string_lossy()).await?;
            Ok(Stores {
                history: Arc::new(SqliteHistory::from_pool(pool.clone()).await?),
                customers: Arc::new(SqliteCustomers::from_pool(pool).await?),
            })
        }
    }
}

/// Build the orchestrator: classifier, enricher and both capability agents
/// share one provider and model.
pub fn build_orchestrator(
    config: &AppConfig,
    stores: Stores,
    provider: Arc<dyn Provider>,
    model: &str,
) -> SessionOrchestrator {
    let routing = &config.routing;

    let classifier = IntentClassifier::new(provider.clone(), model)
        .with_locale(routing.locale)
        .with_timeout(Duration::from_secs(routing.classify_timeout_secs));

    let agent = |capability: Capability| {
        let tools = Arc::new(concierge_tools::registry_for(capability, stores.customers.clone()));
        Arc::new(
            ToolAgent::new(capability, provider.clone(), model, tools)
                .with_locale(routing.locale)
                .with_temperature(config.default_temperature)
                .with_max_tokens(config.default_max_tokens)
                .with_max_iterations(routing.max_tool_iterations),
        )
    };

    let dispatcher = Dispatcher::new()
        .with_agent(agent(Capability::Create))
        .with_agent(agent(Capability::Query))
        .with_agent_timeout(Duration::from_secs(routing.agent_timeout_secs))
        .with_locale(routing.locale);

    info!(
        provider = provider.name(),
        model,
        history = stores.history.name(),
        locale = ?routing.locale,
        "Orchestrator ready"
    );

    SessionOrchestrator::new(
        stores.history,
        classifier,
        ContextEnricher::new(routing.locale),
        dispatcher,
    )
}
