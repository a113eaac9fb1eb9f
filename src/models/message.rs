use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::thought::ThoughtProcess;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A conversation message as the chat session sees it.
///
/// Only assistant messages carry a thought process; construct through
/// [`Message::user`] and [`Message::assistant`] to keep it that way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_process: Option<ThoughtProcess>,
}

impl Message {
    /// Create a user message with a fresh id
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            services: None,
            timestamp: Utc::now(),
            thought_process: None,
        }
    }

    /// Create an assistant message that owns `thought`
    pub fn assistant(
        content: impl Into<String>,
        services: Vec<String>,
        thought: ThoughtProcess,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: content.into(),
            services: Some(services),
            timestamp: Utc::now(),
            thought_process: Some(thought),
        }
    }

    pub fn thought_process(&self) -> Option<&ThoughtProcess> {
        self.thought_process.as_ref()
    }

    /// Replace the thought process of an assistant message. No-op for user
    /// messages.
    pub fn set_thought_process(&mut self, thought: ThoughtProcess) {
        if self.role == MessageRole::Assistant {
            self.thought_process = Some(thought);
        }
    }
}

/// Request body for logging a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub services: Option<Vec<String>>,
}

/// A logged chat message with server-assigned id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub role: MessageRole,
    pub content: String,
    /// `null` when the request carried no services
    pub services: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThoughtStatus;

    fn thought() -> ThoughtProcess {
        ThoughtProcess {
            id: "thought-1".to_string(),
            query_reasoning: String::new(),
            tool_invocations: Vec::new(),
            progress_updates: None,
            final_reasoning: None,
            final_response: String::new(),
            status: ThoughtStatus::Initializing,
        }
    }

    #[test]
    fn test_user_message_never_owns_thought() {
        let mut msg = Message::user("hello");
        assert!(msg.thought_process().is_none());
        msg.set_thought_process(thought());
        assert!(msg.thought_process().is_none());
    }

    #[test]
    fn test_assistant_message_owns_thought() {
        let msg = Message::assistant("crm-analysis", vec!["gmail".to_string()], thought());
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.thought_process().map(|t| t.id.as_str()), Some("thought-1"));
    }

    #[test]
    fn test_new_chat_message_rejects_unknown_role() {
        let result: Result<NewChatMessage, _> =
            serde_json::from_str(r#"{"role": "system", "content": "hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_chat_message_services_optional() {
        let msg: NewChatMessage =
            serde_json::from_str(r#"{"role": "user", "content": "hi"}"#).unwrap();
        assert_eq!(msg.services, None);
    }
}
