//! The staged "thought process" attached to an assistant message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tools::{ToolInvocation, ToolStatus};

/// Overall stage of a thought process.
///
/// Variants are declared in lifecycle order, so `Ord` is the stage order:
/// `Initializing < Reasoning < InvokingTools < FinalReasoning < Completed`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum ThoughtStatus {
    #[default]
    Initializing,
    Reasoning,
    InvokingTools,
    FinalReasoning,
    Completed,
}

/// Status of the final reasoning card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Pending,
    Loading,
    Completed,
}

/// Narrative message shown once the referenced tool has completed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub id: String,
    pub message: String,
    /// Position of the tool invocation this update follows
    pub tool_index: usize,
    pub timestamp: DateTime<Utc>,
}

/// One numbered step inside the final reasoning card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningStep {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 1-based display position
    pub order: u32,
}

/// Synthesis card revealed after all tools resolve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinalReasoning {
    pub title: String,
    pub steps: Vec<ReasoningStep>,
    pub is_expanded: bool,
    pub status: CardStatus,
}

impl FinalReasoning {
    pub fn new(title: impl Into<String>, steps: Vec<ReasoningStep>) -> Self {
        Self {
            title: title.into(),
            steps,
            is_expanded: true,
            status: CardStatus::Pending,
        }
    }

    /// Steps in display order (stable ascending sort on `order`).
    pub fn sorted_steps(&self) -> Vec<&ReasoningStep> {
        let mut steps: Vec<_> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.order);
        steps
    }
}

/// Reasoning, tool use and final answer for one assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtProcess {
    pub id: String,
    pub query_reasoning: String,
    pub tool_invocations: Vec<ToolInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_updates: Option<Vec<ProgressUpdate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_reasoning: Option<FinalReasoning>,
    /// Empty until `status` is `Completed`
    pub final_response: String,
    pub status: ThoughtStatus,
}

impl ThoughtProcess {
    pub fn is_completed(&self) -> bool {
        self.status == ThoughtStatus::Completed
    }

    /// Progress updates whose tool has completed. Updates pointing at a
    /// missing or unfinished tool stay hidden.
    pub fn visible_progress_updates(&self) -> Vec<&ProgressUpdate> {
        self.progress_updates
            .iter()
            .flatten()
            .filter(|update| {
                self.tool_invocations
                    .get(update.tool_index)
                    .is_some_and(|tool| tool.status == ToolStatus::Completed)
            })
            .collect()
    }

    /// Number of tools that have completed or failed
    pub fn resolved_tool_count(&self) -> usize {
        self.tool_invocations
            .iter()
            .filter(|tool| tool.status.is_resolved())
            .count()
    }
}
