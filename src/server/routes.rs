//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;
use crate::models::{ChatMessage, NewChatMessage, Service};

/// `POST /api/chat/messages`
pub(super) async fn create_message(
    State(state): State<AppState>,
    body: Result<Json<NewChatMessage>, JsonRejection>,
) -> Result<Json<ChatMessage>, ApiError> {
    let Json(message) = body.map_err(|rejection| ApiError::InvalidMessage {
        reason: rejection.body_text(),
    })?;

    // any failure while handling the message is reported as invalid data
    let stored = state
        .storage
        .create_chat_message(message)
        .await
        .map_err(|e| ApiError::InvalidMessage {
            reason: format!("{}: {}", e.error_code(), e),
        })?;
    Ok(Json(stored))
}

/// `GET /api/chat/messages`
pub(super) async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state
        .storage
        .get_chat_messages()
        .await
        .map_err(|e| ApiError::FetchFailed {
            reason: format!("{}: {}", e.error_code(), e),
        })?;
    Ok(Json(messages))
}

fn integration_ready(service: Service) -> Json<Value> {
    Json(json!({
        "message": format!("{} integration endpoint ready", service.display_name())
    }))
}

pub(super) async fn salesforce_opportunities() -> Json<Value> {
    integration_ready(Service::Salesforce)
}

pub(super) async fn gmail_messages() -> Json<Value> {
    integration_ready(Service::Gmail)
}

pub(super) async fn gdrive_files() -> Json<Value> {
    integration_ready(Service::Gdrive)
}

pub(super) async fn notion_pages() -> Json<Value> {
    integration_ready(Service::Notion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_messages() {
        assert_eq!(
            integration_ready(Service::Gdrive).0,
            json!({"message": "Google Drive integration endpoint ready"})
        );
        assert_eq!(
            integration_ready(Service::Salesforce).0,
            json!({"message": "Salesforce integration endpoint ready"})
        );
    }
}
