//! Chat session: owns the conversation and the sequencers animating it.
//!
//! Submitting a query appends a user message and an assistant message whose
//! thought process is handed to a freshly spawned [`Sequencer`]. Only the
//! assistant message carries services: the ones its plan uses. Until the
//! session is closed, [`ChatSession::messages`] reads the latest snapshot of
//! every running sequence.

use std::collections::HashMap;

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::{AppConfig, SequencerConfig};
use crate::error::SequenceError;
use crate::generator::{generate_thought_process, GeneratorOptions};
use crate::models::service::default_selection;
use crate::models::Message;
use crate::sequencer::{Card, SequenceHandle, Sequencer};

pub struct ChatSession {
    selected_services: Vec<String>,
    messages: Vec<Message>,
    /// Running sequences keyed by assistant message id
    sequences: HashMap<String, SequenceHandle>,
    generator: GeneratorOptions,
    sequencer: SequencerConfig,
    rng: StdRng,
}

impl ChatSession {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            selected_services: default_selection(),
            messages: Vec::new(),
            sequences: HashMap::new(),
            generator: GeneratorOptions {
                errors: config.errors.clone(),
                final_reasoning: config.sequencer.include_final_reasoning,
            },
            sequencer: config.sequencer.clone(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the selected services.
    pub fn with_services(mut self, services: Vec<String>) -> Self {
        self.selected_services = services;
        self
    }

    /// Use a seeded RNG for reproducible plans.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn selected_services(&self) -> &[String] {
        &self.selected_services
    }

    /// Select or deselect a service. Returns whether it is now selected.
    pub fn toggle_service(&mut self, id: &str) -> bool {
        if let Some(pos) = self.selected_services.iter().position(|s| s == id) {
            self.selected_services.remove(pos);
            false
        } else {
            self.selected_services.push(id.to_string());
            true
        }
    }

    /// Submit a query. Blank queries are ignored.
    ///
    /// Returns the id of the new assistant message. Must be called from
    /// within a tokio runtime.
    pub fn submit(&mut self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.messages.push(Message::user(query));

        let plan = generate_thought_process(
            query,
            &self.selected_services,
            &self.generator,
            &mut self.rng,
        );
        let assistant = Message::assistant(
            plan.classification.rule.message_content(),
            plan.classification.services.clone(),
            plan.thought.clone(),
        );
        let message_id = assistant.id.clone();
        info!(
            message_id = %message_id,
            rule = plan.classification.rule.label(),
            "query submitted"
        );

        let handle = Sequencer::spawn(plan, self.sequencer.clone());
        self.messages.push(assistant);
        self.sequences.insert(message_id.clone(), handle);
        Some(message_id)
    }

    /// The conversation, with live thought process snapshots.
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|message| {
                let mut message = message.clone();
                if let Some(handle) = self.sequences.get(&message.id) {
                    message.set_thought_process(handle.snapshot());
                }
                message
            })
            .collect()
    }

    /// Handle of the sequence animating `message_id`
    pub fn sequence(&self, message_id: &str) -> Option<&SequenceHandle> {
        self.sequences.get(message_id)
    }

    /// Expand or collapse a card. Messages without a running sequence report
    /// [`SequenceError::Cancelled`].
    pub async fn toggle(&self, message_id: &str, card: Card) -> Result<(), SequenceError> {
        let handle = self
            .sequences
            .get(message_id)
            .ok_or(SequenceError::Cancelled)?;
        handle.toggle(card).await
    }

    /// Wait for every running sequence to reach `completed`.
    pub async fn wait_idle(&self) -> Result<(), SequenceError> {
        let results = join_all(self.sequences.values().map(|h| h.wait_completed())).await;
        results.into_iter().try_for_each(|r| r.map(|_| ()))
    }

    /// Cancel every sequence, keeping each message's last snapshot.
    pub fn close(&mut self) {
        if self.sequences.is_empty() {
            return;
        }
        debug!(count = self.sequences.len(), "closing session");
        for message in &mut self.messages {
            if let Some(handle) = self.sequences.remove(&message.id) {
                message.set_thought_process(handle.snapshot());
                handle.cancel();
            }
        }
        self.sequences.clear();
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GENERAL_MESSAGE;
    use crate::models::{MessageRole, ThoughtStatus};
    use std::time::Duration;

    fn session() -> ChatSession {
        ChatSession::new(&AppConfig::default()).with_seed(9)
    }

    #[test]
    fn test_toggle_service() {
        let mut session = session();
        assert_eq!(session.selected_services(), ["salesforce", "gdrive", "gmail"]);
        assert!(!session.toggle_service("gdrive"));
        assert!(session.toggle_service("notion"));
        assert_eq!(session.selected_services(), ["salesforce", "gmail", "notion"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_appends_user_and_assistant() {
        let mut session = session();
        assert!(session.submit("   ").is_none());

        let id = session
            .submit("Show me the opportunity for Green and Sons")
            .unwrap();
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert!(messages[0].thought_process().is_none());
        assert!(messages[0].services.is_none());
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].id, id);
        assert_eq!(messages[1].content, "salesforce-opportunity");
        assert_eq!(
            messages[1].services.as_deref(),
            Some(&["salesforce".to_string(), "gmail".to_string()][..])
        );
        assert_eq!(
            messages[1].thought_process().map(|t| t.status),
            Some(ThoughtStatus::Initializing)
        );

        session.wait_idle().await.unwrap();
        let thought = session.messages()[1].thought_process().cloned().unwrap();
        assert!(thought.is_completed());
        assert!(thought.final_response.contains("Green and Sons"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_general_query_message_content() {
        let mut session = session();
        session.submit("hello").unwrap();
        let messages = session.messages();
        assert!(messages[0].services.is_none());
        assert_eq!(messages[1].content, GENERAL_MESSAGE);
        // general plans use the first two selected services
        assert_eq!(
            messages[1].services.as_deref(),
            Some(&["salesforce".to_string(), "gdrive".to_string()][..])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_freezes_snapshots() {
        let mut session = session();
        let id = session.submit("hello").unwrap();
        tokio::time::sleep(Duration::from_millis(900)).await;
        session.close();
        tokio::time::sleep(Duration::from_secs(30)).await;

        let messages = session.messages();
        let thought = messages[1].thought_process().unwrap();
        assert_eq!(thought.status, ThoughtStatus::Reasoning);
        assert!(session.sequence(&id).is_none());
        assert_eq!(
            session.toggle(&id, Card::Tool(0)).await.unwrap_err(),
            SequenceError::Cancelled
        );
    }
}
