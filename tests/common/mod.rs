//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;

use venn::config::{ErrorInjectionConfig, ServerConfig};
use venn::error::StorageError;
use venn::generator::{generate_thought_process, GeneratorOptions, Plan};
use venn::server::start_server;
use venn::models::{ChatMessage, NewChatMessage, NewUser, User};
use venn::storage::{MemStorage, Storage};

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Generate a plan with the default error settings and a fixed seed.
pub fn plan(query: &str, services: &[&str], final_reasoning: bool) -> Plan {
    plan_with(query, services, ErrorInjectionConfig::default(), final_reasoning, 42)
}

pub fn plan_with(
    query: &str,
    services: &[&str],
    errors: ErrorInjectionConfig,
    final_reasoning: bool,
    seed: u64,
) -> Plan {
    let options = GeneratorOptions {
        errors,
        final_reasoning,
    };
    generate_thought_process(query, &ids(services), &options, &mut StdRng::seed_from_u64(seed))
}

/// Start the API on an ephemeral port with empty storage.
pub async fn start_test_server() -> (JoinHandle<()>, SocketAddr) {
    start_test_server_with(Arc::new(MemStorage::new())).await
}

pub async fn start_test_server_with(storage: Arc<dyn Storage>) -> (JoinHandle<()>, SocketAddr) {
    let config = ServerConfig::default().with_port(0);
    start_server(&config, storage)
        .await
        .expect("Failed to start server")
}

/// Storage whose every operation fails with `StorageError::Unavailable`.
pub struct UnavailableStorage;

fn unavailable<T>() -> Result<T, StorageError> {
    Err(StorageError::Unavailable("backing store offline".to_string()))
}

#[async_trait]
impl Storage for UnavailableStorage {
    async fn get_user(&self, _id: u64) -> Result<Option<User>, StorageError> {
        unavailable()
    }

    async fn get_user_by_username(&self, _username: &str) -> Result<Option<User>, StorageError> {
        unavailable()
    }

    async fn create_user(&self, _user: NewUser) -> Result<User, StorageError> {
        unavailable()
    }

    async fn get_chat_messages(&self) -> Result<Vec<ChatMessage>, StorageError> {
        unavailable()
    }

    async fn create_chat_message(
        &self,
        _message: NewChatMessage,
    ) -> Result<ChatMessage, StorageError> {
        unavailable()
    }
}
