//! In-memory storage for users and the chat message log.
//!
//! [`Storage`] is the seam the HTTP layer talks to; [`MemStorage`] is the
//! only implementation. Contents live for the lifetime of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::models::{ChatMessage, NewChatMessage, NewUser, User};

/// Storage operations used by the API
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: u64) -> Result<Option<User>, StorageError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Insert a user with the next id. Usernames are unique.
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    /// All logged messages, oldest first
    async fn get_chat_messages(&self) -> Result<Vec<ChatMessage>, StorageError>;

    /// Log a message, assigning the next id and the current time
    async fn create_chat_message(&self, message: NewChatMessage)
        -> Result<ChatMessage, StorageError>;
}

#[derive(Debug)]
struct Tables {
    users: HashMap<u64, User>,
    messages: HashMap<u64, ChatMessage>,
    next_user_id: u64,
    next_message_id: u64,
}

/// Process-local [`Storage`]. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                users: HashMap::new(),
                messages: HashMap::new(),
                next_user_id: 1,
                next_message_id: 1,
            }),
        }
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: u64) -> Result<Option<User>, StorageError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StorageError::UsernameTaken {
                username: user.username,
            });
        }

        let id = tables.next_user_id;
        tables.next_user_id += 1;
        let user = User {
            id,
            username: user.username,
            password: user.password,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_chat_messages(&self) -> Result<Vec<ChatMessage>, StorageError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<ChatMessage> = tables.messages.values().cloned().collect();
        // timestamps can tie; ids keep insertion order
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn create_chat_message(
        &self,
        message: NewChatMessage,
    ) -> Result<ChatMessage, StorageError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_message_id;
        tables.next_message_id += 1;

        let message = ChatMessage {
            id,
            role: message.role,
            content: message.content,
            services: message.services,
            timestamp: Utc::now(),
        };
        tables.messages.insert(id, message.clone());
        tracing::debug!(id, role = ?message.role, "stored chat message");
        Ok(message)
    }
}
