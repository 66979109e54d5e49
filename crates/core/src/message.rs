//! Message and conversation buffer domain types.
//!
//! These are the core value objects that flow through the router:
//! user sends a turn → it is persisted as a `Message` → the session's history is
//! replayed into a `ConversationBuffer` → the buffer feeds classification,
//! enrichment and the capability agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a session (one conversation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh, globally unique session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    /// Use the caller's id verbatim when present and non-blank, otherwise
    /// mint one. The id is an opaque key: it is never trimmed or rewritten.
    pub fn resolve(supplied: Option<&str>) -> Self {
        match supplied {
            Some(s) if !s.trim().is_empty() => Self::from(s),
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The router's reply
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A single turn half, as recorded in the history store.
///
/// Messages are never mutated once stored. Within a session, `timestamp` is
/// strictly increasing in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Session this message belongs to
    pub session_id: SessionId,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Per-request, in-memory reconstruction of a session's history.
///
/// The history store is authoritative; the buffer only lives for one turn.
/// It remembers where the turn currently being processed starts so that
/// classification and enrichment can look at the prior turns alone.
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    session_id: SessionId,
    messages: Vec<Message>,
    current_turn: Option<usize>,
}

impl ConversationBuffer {
    /// Create an empty buffer for a session.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
            current_turn: None,
        }
    }

    /// Build a buffer from messages already in store order.
    pub fn from_history(session_id: SessionId, messages: Vec<Message>) -> Self {
        Self {
            session_id,
            messages,
            current_turn: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Append the inbound user turn and mark it as the turn being processed.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.current_turn = Some(self.messages.len());
        self.messages.push(Message::user(self.session_id.clone(), content));
    }

    /// Append a generated reply.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages
            .push(Message::assistant(self.session_id.clone(), content));
    }

    /// Every message in order, including the current turn.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages that precede the turn being processed.
    ///
    /// Before any `push_user` this is the whole buffer.
    pub fn prior_turns(&self) -> &[Message] {
        match self.current_turn {
            Some(idx) => &self.messages[..idx],
            None => &self.messages,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user(SessionId::from("s1"), "Hola");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hola");
        assert_eq!(msg.session_id.as_str(), "s1");
    }

    #[test]
    fn resolve_keeps_supplied_id() {
        assert_eq!(SessionId::resolve(Some("abc")).as_str(), "abc");
        assert_eq!(SessionId::resolve(Some(" s1 ")).as_str(), " s1 ");
    }

    #[test]
    fn resolve_generates_for_missing_or_blank() {
        let a = SessionId::resolve(None);
        let b = SessionId::resolve(Some("   "));
        assert!(!a.as_str().is_empty());
        assert!(!b.as_str().trim().is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn role_parses_from_storage_text() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert!("system".parse::<Role>().is_err());
    }

    #[test]
    fn prior_turns_excludes_current_turn() {
        let sid = SessionId::from("s1");
        let mut buffer = ConversationBuffer::from_history(
            sid.clone(),
            vec![
                Message::user(sid.clone(), "Crea un cliente"),
                Message::assistant(sid.clone(), "¿Cuál es el nombre?"),
            ],
        );
        assert_eq!(buffer.prior_turns().len(), 2);

        buffer.push_user("Se llama Juan");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.prior_turns().len(), 2);
        assert_eq!(buffer.messages()[2].content, "Se llama Juan");

        buffer.push_assistant("¿Y su email?");
        assert_eq!(buffer.prior_turns().len(), 2);
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn empty_buffer_has_no_prior_turns() {
        let mut buffer = ConversationBuffer::new(SessionId::from("s1"));
        assert!(buffer.is_empty());
        buffer.push_user("Hola");
        assert!(buffer.prior_turns().is_empty());
    }

    #[test]
    fn message_serializes_role_lowercase() {
        let msg = Message::assistant(SessionId::from("s1"), "ok");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"assistant\""));
        assert!(json.contains("\"session_id\":\"s1\""));
    }
}
