//! Response generator.
//!
//! Turns a user query and the selected services into a [`Plan`]: a
//! [`ThoughtProcess`] in `initializing` state plus what is needed to compose
//! the final response once the sequencer reaches `completed`.
//!
//! - `classify` - prioritized rule list (scenario overrides, keyword kinds)
//! - `tools` - per-service mock pools, scripted sequences, error injection
//! - `text` - reasoning sentences, progress updates, final reasoning, answers
//!
//! Everything here is pure apart from the injected RNG, which only the
//! generic tool path consumes.

mod classify;
mod text;
mod tools;

pub use classify::{classify, Classification, QueryKind, Rule, Scenario, GENERAL_MESSAGE};
pub use text::{compose_final_response, compose_reasoning, final_reasoning, progress_updates};
pub use tools::{plan_tool_invocations, ACCESS_ROLE};

use rand::Rng;

use crate::config::ErrorInjectionConfig;
use crate::models::{ThoughtProcess, ThoughtStatus};

/// A freshly generated thought process and the inputs of its final answer.
#[derive(Debug, Clone)]
pub struct Plan {
    pub thought: ThoughtProcess,
    pub classification: Classification,
    pub query: String,
    errors: ErrorInjectionConfig,
}

impl Plan {
    /// The final response for this plan, given the tool statuses currently
    /// held in `thought`. Called by the sequencer on completion, once every
    /// tool has resolved.
    pub fn compose_final_response(&self) -> String {
        compose_final_response(
            &self.classification,
            &self.query,
            &self.errors,
            &self.thought.tool_invocations,
        )
    }
}

/// Options for [`generate_thought_process`]
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub errors: ErrorInjectionConfig,
    /// Attach a final reasoning block
    pub final_reasoning: bool,
}

/// Classify `query` and build its plan.
pub fn generate_thought_process<R: Rng>(
    query: &str,
    services: &[String],
    options: &GeneratorOptions,
    rng: &mut R,
) -> Plan {
    let classification = classify(query, services);
    let errors = &options.errors;

    let thought = ThoughtProcess {
        id: format!("thought-{}", uuid::Uuid::new_v4()),
        query_reasoning: compose_reasoning(&classification, query, errors),
        tool_invocations: plan_tool_invocations(&classification, query, errors, rng),
        progress_updates: progress_updates(&classification, query, errors),
        final_reasoning: options
            .final_reasoning
            .then(|| final_reasoning(&classification)),
        final_response: String::new(),
        status: ThoughtStatus::Initializing,
    };

    tracing::debug!(
        thought_id = %thought.id,
        rule = classification.rule.label(),
        tools = thought.tool_invocations.len(),
        "generated thought process"
    );

    Plan {
        thought,
        classification,
        query: query.to_string(),
        errors: options.errors.clone(),
    }
}
