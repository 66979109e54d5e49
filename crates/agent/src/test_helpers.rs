//! Shared test doubles for the routing tests.

use async_trait::async_trait;
use concierge_core::agent::CapabilityAgent;
use concierge_core::error::{AgentError, ProviderError, StorageError};
use concierge_core::history::HistoryStore;
use concierge_core::intent::Capability;
use concierge_core::message::{ConversationBuffer, Message, Role};
use concierge_core::provider::{
    ChatMessage, MessageToolCall, Provider, ProviderRequest, ProviderResponse, Usage,
};
use std::sync::Mutex;
use std::time::Duration;

/// A mock provider that plays back scripted results in order and records
/// every request it receives.
///
/// Panics if more calls are made than results provided.
pub struct ScriptedProvider {
    script: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider answering each call with the given texts, in order.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t))).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let script = self.script.lock().unwrap();
        let index = requests.len();
        if index >= script.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{index}, have {})",
                script.len()
            );
        }
        requests.push(request);
        script[index].clone()
    }
}

/// A provider that never answers within any reasonable timeout.
pub struct StallingProvider;

#[async_trait]
impl Provider for StallingProvider {
    fn name(&self) -> &str {
        "stalling_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ProviderError::Timeout("stalled".into()))
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: ChatMessage::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response asking for tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut message = ChatMessage::assistant("");
    message.tool_calls = tool_calls;
    ProviderResponse {
        message,
        usage: None,
        model: "mock-model".into(),
    }
}

pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// A capability agent that records what it was handed.
pub struct RecordingAgent {
    capability: Capability,
    outcome: Result<String, String>,
    delay: Option<Duration>,
    pub inputs: Mutex<Vec<String>>,
    pub buffers: Mutex<Vec<Vec<Message>>>,
}

impl RecordingAgent {
    pub fn replying(capability: Capability, reply: &str) -> Self {
        Self {
            capability,
            outcome: Ok(reply.to_string()),
            delay: None,
            inputs: Mutex::new(Vec::new()),
            buffers: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(capability: Capability, error: &str) -> Self {
        Self {
            outcome: Err(error.to_string()),
            ..Self::replying(capability, "")
        }
    }

    pub fn slow(capability: Capability, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(capability, "tarde")
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CapabilityAgent for RecordingAgent {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn invoke(
        &self,
        enriched_input: &str,
        session_memory: &ConversationBuffer,
    ) -> Result<String, AgentError> {
        self.inputs.lock().unwrap().push(enriched_input.to_string());
        self.buffers
            .lock()
            .unwrap()
            .push(session_memory.messages().to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome
            .clone()
            .map_err(|e| AgentError::Provider(ProviderError::Network(e)))
    }
}

/// A history store whose every operation fails.
pub struct BrokenHistory;

#[async_trait]
impl HistoryStore for BrokenHistory {
    fn name(&self) -> &str {
        "broken"
    }

    async fn append(&self, _session_id: &str, _role: Role, _content: &str) -> Result<Message, StorageError> {
        Err(StorageError::Storage("database is locked".into()))
    }

    async fn list(&self, _session_id: &str) -> Result<Vec<Message>, StorageError> {
        Err(StorageError::Storage("database is locked".into()))
    }

    async fn clear(&self, _session_id: &str) -> Result<usize, StorageError> {
        Err(StorageError::Storage("database is locked".into()))
    }
}
