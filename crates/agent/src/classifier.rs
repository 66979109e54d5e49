//! Intent classifier.
//!
//! One text-generation call decides whether a turn is a `create` or a
//! `query`. The primary call sees the session history so that follow-ups
//! ("his email is ...") keep the intent of the request they continue. If that
//! call fails, a second call is made with the current message only.

use concierge_core::error::{ClassificationError, ProviderError};
use concierge_core::intent::{Intent, Locale};
use concierge_core::message::Message;
use concierge_core::provider::{ChatMessage, Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::prompts;

/// Labels are one word; keep the completion short.
const CLASSIFIER_MAX_TOKENS: u32 = 10;

pub struct IntentClassifier {
    provider: Arc<dyn Provider>,
    model: String,
    locale: Locale,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            locale: Locale::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Upper bound for each of the two calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify `current_message` given the turns that preceded it.
    pub async fn classify(
        &self,
        current_message: &str,
        history: &[Message],
    ) -> Result<Intent, ClassificationError> {
        let primary = self.with_history_request(current_message, history);
        let primary_err = match self.call(primary).await {
            Ok(raw) => return Ok(self.decode(&raw, "with_history")),
            Err(e) => e,
        };

        warn!(error = %primary_err, "History-aware classification failed, retrying without history");

        let fallback = self.without_history_request(current_message);
        match self.call(fallback).await {
            Ok(raw) => Ok(self.decode(&raw, "without_history")),
            Err(fallback_err) => Err(ClassificationError {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        }
    }

    fn with_history_request(&self, current_message: &str, history: &[Message]) -> ProviderRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(prompts::classifier_with_history(self.locale)));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(current_message));
        self.request(messages)
    }

    fn without_history_request(&self, current_message: &str) -> ProviderRequest {
        self.request(vec![
            ChatMessage::system(prompts::classifier_without_history(self.locale)),
            ChatMessage::user(current_message),
        ])
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.0,
            max_tokens: Some(CLASSIFIER_MAX_TOKENS),
            tools: Vec::new(),
        }
    }

    async fn call(&self, request: ProviderRequest) -> Result<String, ProviderError> {
        match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(result) => result.map(|r| r.message.content),
            Err(_) => Err(ProviderError::Timeout(format!(
                "classification exceeded {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    fn decode(&self, raw: &str, path: &'static str) -> Intent {
        let intent = Intent::from_label(raw);
        debug!(path, raw = raw.trim(), intent = %intent, "Intent classified");
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use concierge_core::message::SessionId;
    use concierge_core::provider::ChatRole;

    fn history() -> Vec<Message> {
        let sid = SessionId::from("s1");
        vec![
            Message::user(sid.clone(), "Crea un cliente"),
            Message::assistant(sid, "¿Cuál es su nombre y email?"),
        ]
    }

    #[tokio::test]
    async fn primary_call_sees_history_then_current_message() {
        let provider = Arc::new(ScriptedProvider::texts(&["crear"]));
        let classifier = IntentClassifier::new(provider.clone(), "mock-model");

        let intent = classifier.classify("Se llama Juan", &history()).await.unwrap();
        assert_eq!(intent, Intent::Create);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].content, "Crea un cliente");
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[3].content, "Se llama Juan");
        assert_eq!(requests[0].temperature, 0.0);
    }

    #[tokio::test]
    async fn raw_answer_is_trimmed_and_case_folded() {
        let provider = Arc::new(ScriptedProvider::texts(&["  Consultar\n"]));
        let classifier = IntentClassifier::new(provider, "mock-model");
        assert_eq!(classifier.classify("Lista los clientes", &[]).await.unwrap(), Intent::Query);
    }

    #[tokio::test]
    async fn unrecognised_answer_is_unknown_not_error() {
        let provider = Arc::new(ScriptedProvider::texts(&["borrar"]));
        let classifier = IntentClassifier::new(provider.clone(), "mock-model");
        assert_eq!(classifier.classify("Borra a Juan", &[]).await.unwrap(), Intent::Unknown);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn fallback_ignores_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::RateLimited { retry_after_secs: 5 }),
            Ok(make_text_response("crear")),
        ]));
        let classifier = IntentClassifier::new(provider.clone(), "mock-model");

        let intent = classifier.classify("Se llama Juan", &history()).await.unwrap();
        assert_eq!(intent, Intent::Create);

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].messages.len(), 2);
        assert_eq!(requests[1].messages[1].content, "Se llama Juan");
    }

    #[tokio::test]
    async fn both_paths_failing_reports_both_errors() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Network("connection reset".into())),
            Err(ProviderError::AuthenticationFailed("bad key".into())),
        ]));
        let classifier = IntentClassifier::new(provider, "mock-model");

        let err = classifier.classify("hola", &[]).await.unwrap_err();
        assert!(err.primary.contains("connection reset"));
        assert!(err.fallback.contains("bad key"));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_times_out_on_both_paths() {
        let classifier = IntentClassifier::new(Arc::new(StallingProvider), "mock-model")
            .with_timeout(Duration::from_secs(2));

        let err = classifier.classify("hola", &[]).await.unwrap_err();
        assert!(err.primary.contains("2s"));
        assert!(err.fallback.contains("2s"));
    }

    #[tokio::test]
    async fn english_locale_uses_english_prompt() {
        let provider = Arc::new(ScriptedProvider::texts(&["query"]));
        let classifier = IntentClassifier::new(provider.clone(), "mock-model").with_locale(Locale::En);

        assert_eq!(classifier.classify("Show customers", &[]).await.unwrap(), Intent::Query);
        assert!(provider.requests()[0].messages[0].content.contains("receptionist"));
    }
}
