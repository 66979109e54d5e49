//! Capability agent backed by an LLM with a scoped tool registry.
//!
//! Follows a **call → act → observe** cycle: the model sees the agent
//! prefix, the session's prior turns and the enriched input; any tool calls
//! it makes are executed and their results fed back until it answers in
//! plain text.

use async_trait::async_trait;
use concierge_core::agent::CapabilityAgent;
use concierge_core::error::{AgentError, ToolError};
use concierge_core::intent::{Capability, Locale};
use concierge_core::message::ConversationBuffer;
use concierge_core::provider::{ChatMessage, Provider, ProviderRequest};
use concierge_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prompts;

pub struct ToolAgent {
    capability: Capability,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    prefix: String,
    max_iterations: u32,
}

impl ToolAgent {
    pub fn new(
        capability: Capability,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            capability,
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            tools,
            prefix: prompts::agent_prefix(capability, Locale::default()).to_string(),
            max_iterations: 8,
        }
    }

    /// Use the localized prefix for this agent's capability.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.prefix = prompts::agent_prefix(self.capability, locale).to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the maximum number of model round trips per invocation.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    fn transcript(&self, enriched_input: &str, session_memory: &ConversationBuffer) -> Vec<ChatMessage> {
        let prior = session_memory.prior_turns();
        let mut messages = Vec::with_capacity(prior.len() + 2);
        messages.push(ChatMessage::system(&self.prefix));
        messages.extend(prior.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(enriched_input));
        messages
    }
}

#[async_trait]
impl CapabilityAgent for ToolAgent {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn invoke(
        &self,
        enriched_input: &str,
        session_memory: &ConversationBuffer,
    ) -> Result<String, AgentError> {
        let session_id = session_memory.session_id();
        info!(
            session_id = %session_id,
            capability = %self.capability,
            messages = session_memory.len(),
            tools = ?self.tools.names(),
            "Running capability agent"
        );

        let mut messages = self.transcript(enriched_input, session_memory);
        let tool_definitions = self.tools.definitions();

        for iteration in 1..=self.max_iterations {
            debug!(session_id = %session_id, iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;

            if response.message.tool_calls.is_empty() {
                return Ok(response.message.content);
            }

            let tool_calls = response.message.tool_calls.clone();
            messages.push(response.message);

            for tc in &tool_calls {
                let outcome = match serde_json::from_str(&tc.arguments) {
                    Ok(arguments) => {
                        let call = ToolCall {
                            id: tc.id.clone(),
                            name: tc.name.clone(),
                            arguments,
                        };
                        self.tools.execute(&call).await
                    }
                    Err(e) => Err(ToolError::InvalidArguments(format!(
                        "arguments are not valid JSON: {e}"
                    ))),
                };

                match outcome {
                    Ok(result) => {
                        debug!(tool = %tc.name, success = result.success, "Tool executed");
                        messages.push(ChatMessage::tool_result(&tc.id, result.output));
                    }
                    Err(e) if e.is_recoverable() => {
                        warn!(tool = %tc.name, error = %e, "Tool call rejected, reporting to model");
                        messages.push(ChatMessage::tool_result(&tc.id, format!("Error: {e}")));
                    }
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool execution failed");
                        return Err(AgentError::Tool(e));
                    }
                }
            }
        }

        warn!(
            session_id = %session_id,
            iterations = self.max_iterations,
            "Max tool iterations reached"
        );
        Err(AgentError::IterationLimit(self.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use concierge_core::customer::CustomerStore;
    use concierge_core::error::ProviderError;
    use concierge_core::message::SessionId;
    use concierge_core::provider::ChatRole;
    use concierge_memory::InMemoryCustomers;

    fn create_agent(provider: Arc<ScriptedProvider>, store: Arc<InMemoryCustomers>) -> ToolAgent {
        let tools = Arc::new(concierge_tools::create_registry(store));
        ToolAgent::new(Capability::Create, provider, "mock-model", tools)
    }

    fn buffer_with_current(text: &str) -> ConversationBuffer {
        let mut buffer = ConversationBuffer::new(SessionId::from("s1"));
        buffer.push_user(text);
        buffer
    }

    #[tokio::test]
    async fn plain_answer_needs_no_tools() {
        let provider = Arc::new(ScriptedProvider::texts(&["¿Cuál es el email del cliente?"]));
        let agent = create_agent(provider.clone(), Arc::new(InMemoryCustomers::new()));

        let out = agent
            .invoke("Crea un cliente llamado Ana", &buffer_with_current("Crea un cliente llamado Ana"))
            .await
            .unwrap();
        assert_eq!(out, "¿Cuál es el email del cliente?");

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "create_customer");
    }

    #[tokio::test]
    async fn tool_call_then_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(make_tool_call_response(vec![make_tool_call(
                "create_customer",
                serde_json::json!({"name": "Ana", "email": "ana@x.com"}),
            )])),
            Ok(make_text_response("✅ Cliente creado: Ana (ana@x.com)")),
        ]));
        let store = Arc::new(InMemoryCustomers::new());
        let agent = create_agent(provider.clone(), store.clone());

        let input = "Crea un cliente llamado Ana con email ana@x.com";
        let out = agent.invoke(input, &buffer_with_current(input)).await.unwrap();
        assert_eq!(out, "✅ Cliente creado: Ana (ana@x.com)");
        assert_eq!(store.list().await.unwrap().len(), 1);

        let second = &provider.requests()[1];
        let tool_msg = second.messages.last().unwrap();
        assert_eq!(tool_msg.role, ChatRole::Tool);
        assert_eq!(tool_msg.content, "✅ Cliente creado: Ana (ana@x.com)");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_create_customer"));
    }

    #[tokio::test]
    async fn transcript_carries_prior_turns_then_enriched_input() {
        let provider = Arc::new(ScriptedProvider::texts(&["ok"]));
        let agent = create_agent(provider.clone(), Arc::new(InMemoryCustomers::new()));

        let sid = SessionId::from("s1");
        let mut buffer = ConversationBuffer::from_history(
            sid.clone(),
            vec![
                concierge_core::Message::user(sid.clone(), "Mi nombre es Luis"),
                concierge_core::Message::assistant(sid, "¿Tu correo?"),
            ],
        );
        buffer.push_user("luis@x.com");

        agent.invoke("ENRIQUECIDO", &buffer).await.unwrap();
        let messages = &provider.requests()[0].messages;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, "Mi nombre es Luis");
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[3].content, "ENRIQUECIDO");
    }

    #[tokio::test]
    async fn invalid_arguments_are_fed_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(make_tool_call_response(vec![make_tool_call(
                "create_customer",
                serde_json::json!({"name": "Ana"}),
            )])),
            Ok(make_text_response("¿Cuál es el email?")),
        ]));
        let agent = create_agent(provider.clone(), Arc::new(InMemoryCustomers::new()));

        let out = agent.invoke("Crea a Ana", &buffer_with_current("Crea a Ana")).await.unwrap();
        assert_eq!(out, "¿Cuál es el email?");
        let feedback = provider.requests()[1].messages.last().unwrap().content.clone();
        assert!(feedback.starts_with("Error: Invalid tool arguments"));
    }

    #[tokio::test]
    async fn duplicate_email_aborts_with_tool_error() {
        let store = Arc::new(InMemoryCustomers::new());
        store
            .create(concierge_core::NewCustomer { name: "Ana".into(), email: "ana@x.com".into() })
            .await
            .unwrap();

        let provider = Arc::new(ScriptedProvider::new(vec![Ok(make_tool_call_response(vec![
            make_tool_call("create_customer", serde_json::json!({"name": "Ana", "email": "ana@x.com"})),
        ]))]));
        let agent = create_agent(provider, store);

        let err = agent.invoke("Crea a Ana", &buffer_with_current("Crea a Ana")).await.unwrap_err();
        assert!(matches!(err, AgentError::Tool(ToolError::ExecutionFailed { .. })));
        assert!(err.to_string().contains("ana@x.com"));
    }

    #[tokio::test]
    async fn unknown_tool_is_recoverable() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(make_tool_call_response(vec![make_tool_call("delete_customer", serde_json::json!({}))])),
            Ok(make_text_response("Solo puedo crear clientes.")),
        ]));
        let agent = create_agent(provider, Arc::new(InMemoryCustomers::new()));
        let out = agent.invoke("Borra a Ana", &buffer_with_current("Borra a Ana")).await.unwrap();
        assert_eq!(out, "Solo puedo crear clientes.");
    }

    #[tokio::test]
    async fn iteration_limit_is_an_error() {
        let looping = || Ok(make_tool_call_response(vec![make_tool_call("nope", serde_json::json!({}))]));
        let provider = Arc::new(ScriptedProvider::new(vec![looping(), looping()]));
        let agent = create_agent(provider.clone(), Arc::new(InMemoryCustomers::new())).with_max_iterations(2);

        let err = agent.invoke("x", &buffer_with_current("x")).await.unwrap_err();
        assert!(matches!(err, AgentError::IterationLimit(2)));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::ApiError {
            status_code: 500,
            message: "upstream exploded".into(),
        })]));
        let agent = create_agent(provider, Arc::new(InMemoryCustomers::new()));
        let err = agent.invoke("x", &buffer_with_current("x")).await.unwrap_err();
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn query_agent_lists_customers() {
        let store = Arc::new(InMemoryCustomers::new());
        store
            .create(concierge_core::NewCustomer { name: "Eva".into(), email: "eva@x.com".into() })
            .await
            .unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(make_tool_call_response(vec![make_tool_call("list_customers", serde_json::json!({}))])),
            Ok(make_text_response("Clientes:\n- Eva | eva@x.com")),
        ]));
        let tools = Arc::new(concierge_tools::query_registry(store));
        let agent = ToolAgent::new(Capability::Query, provider.clone(), "mock-model", tools)
            .with_locale(Locale::Es);

        let out = agent.invoke("Lista", &buffer_with_current("Lista")).await.unwrap();
        assert!(out.contains("Eva"));
        assert_eq!(provider.requests()[1].messages.last().unwrap().content, "- Eva | eva@x.com");
    }
}
