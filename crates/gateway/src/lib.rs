//! HTTP API gateway for Concierge.
//!
//! Exposes the session orchestrator over REST: one chat endpoint plus
//! history inspection and deletion. Every chat request gets a reply; only
//! the history endpoints can fail, with 503 when the store is unavailable.
//!
//! Built on Axum.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use concierge_agent::{SessionOrchestrator, TurnOutcome};
use concierge_core::error::StorageError;

/// Header carrying the caller's session id.
pub const SESSION_HEADER: &str = "session-id";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Arc<SessionOrchestrator>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - permissive CORS
/// - request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route(
            "/history/{session_id}",
            get(history_handler).delete(clear_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(1024 * 1024)),
        )
        .with_state(state)
}

/// Start the gateway HTTP server on the configured host and port.
pub async fn start(
    config: &concierge_config::AppConfig,
    orchestrator: Arc<SessionOrchestrator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(Arc::new(GatewayState { orchestrator }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn storage_unavailable(session_id: &str, e: StorageError) -> ApiError {
    warn!(session_id, error = %e, "History store unavailable");
    api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
}

#[derive(Serialize)]
struct IndexResponse {
    service: &'static str,
    version: &'static str,
    endpoints: Vec<&'static str>,
}

async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: "concierge",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "GET /health",
            "POST /chat",
            "GET /history/{session_id}",
            "DELETE /history/{session_id}",
        ],
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    history_backend: String,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        history_backend: state.orchestrator.history_backend().to_string(),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(alias = "mensaje")]
    message: String,
}

async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message must not be empty"));
    }

    let session_id = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());
    let outcome = state
        .orchestrator
        .submit_turn(session_id, &payload.message)
        .await;

    Ok(Json(outcome))
}

#[derive(Serialize)]
struct HistoryEntry {
    role: &'static str,
    content: String,
    timestamp: String,
}

#[derive(Serialize)]
struct HistoryResponse {
    session_id: String,
    total_messages: usize,
    history: Vec<HistoryEntry>,
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let messages = state
        .orchestrator
        .get_history(&session_id)
        .await
        .map_err(|e| storage_unavailable(&session_id, e))?;

    let history: Vec<HistoryEntry> = messages
        .into_iter()
        .map(|m| HistoryEntry {
            role: m.role.as_str(),
            content: m.content,
            timestamp: m.timestamp.to_rfc3339(),
        })
        .collect();

    Ok(Json(HistoryResponse {
        total_messages: history.len(),
        session_id,
        history,
    }))
}

#[derive(Serialize)]
struct ClearResponse {
    message: String,
    session_id: String,
    deleted: usize,
}

async fn clear_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    let deleted = state
        .orchestrator
        .clear_history(&session_id)
        .await
        .map_err(|e| storage_unavailable(&session_id, e))?;

    Ok(Json(ClearResponse {
        message: format!("History for session {session_id} cleared"),
        session_id,
        deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use concierge_agent::test_helpers::{BrokenHistory, ScriptedProvider};
    use concierge_agent::{ContextEnricher, Dispatcher, IntentClassifier, Stores};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app(replies: &[&str]) -> Router {
        let orchestrator = concierge_agent::build_orchestrator(
            &concierge_config::AppConfig::default(),
            Stores::in_memory(),
            Arc::new(ScriptedProvider::texts(replies)),
            "mock-model",
        );
        build_router(Arc::new(GatewayState {
            orchestrator: Arc::new(orchestrator),
        }))
    }

    fn broken_app() -> Router {
        let orchestrator = SessionOrchestrator::new(
            Arc::new(BrokenHistory),
            IntentClassifier::new(Arc::new(ScriptedProvider::texts(&["consultar"])), "mock-model"),
            ContextEnricher::default(),
            Dispatcher::new(),
        );
        build_router(Arc::new(GatewayState {
            orchestrator: Arc::new(orchestrator),
        }))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn chat_request(session: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json");
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn health_reports_history_backend() {
        let app = test_app(&[]);
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["history_backend"], "in_memory");
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let app = test_app(&[]);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let json = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json["service"], "concierge");
        assert!(json["endpoints"].as_array().unwrap().len() >= 4);
    }

    #[tokio::test]
    async fn chat_returns_reply_intent_and_session() {
        let app = test_app(&["consultar", "📭 No hay clientes registrados"]);
        let req = chat_request(Some("s-http"), serde_json::json!({"message": "Lista los clientes"}));

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["reply"], "📭 No hay clientes registrados");
        assert_eq!(json["session_id"], "s-http");
        assert_eq!(json["intent"], "query");
    }

    #[tokio::test]
    async fn chat_accepts_mensaje_and_mints_session_id() {
        let app = test_app(&["consultar", "listo"]);
        let req = chat_request(None, serde_json::json!({"mensaje": "Lista los clientes"}));

        let json = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json["reply"], "listo");
        assert!(!json["session_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let app = test_app(&[]);
        let req = chat_request(Some("s1"), serde_json::json!({"message": "   "}));

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn history_lists_turn_then_clear_empties_it() {
        let app = test_app(&["consultar", "sin clientes"]);

        let chat = chat_request(Some("s-hist"), serde_json::json!({"message": "Lista los clientes"}));
        app.clone().oneshot(chat).await.unwrap();

        let get = Request::builder()
            .uri("/history/s-hist")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.clone().oneshot(get).await.unwrap()).await;
        assert_eq!(json["total_messages"], 2);
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][0]["content"], "Lista los clientes");
        assert_eq!(json["history"][1]["role"], "assistant");
        assert!(json["history"][0]["timestamp"].is_string());

        let delete = Request::builder()
            .method("DELETE")
            .uri("/history/s-hist")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.clone().oneshot(delete).await.unwrap()).await;
        assert_eq!(json["deleted"], 2);
        assert_eq!(json["session_id"], "s-hist");

        let get = Request::builder()
            .uri("/history/s-hist")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.oneshot(get).await.unwrap()).await;
        assert_eq!(json["total_messages"], 0);
    }

    #[tokio::test]
    async fn clearing_unknown_session_succeeds() {
        let app = test_app(&[]);
        let req = Request::builder()
            .method("DELETE")
            .uri("/history/nobody")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["deleted"], 0);
    }

    #[tokio::test]
    async fn broken_store_maps_to_service_unavailable() {
        let app = broken_app();
        let req = Request::builder()
            .uri("/history/s1")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_json(response).await["error"].is_string());

        // Chat still answers.
        let req = chat_request(Some("s1"), serde_json::json!({"message": "hola"}));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_json(response).await["reply"].as_str().unwrap().is_empty());
    }
}
