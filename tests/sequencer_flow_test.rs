//! Stage sequencing properties, on the virtual clock and on tokio time.

mod common;

use std::time::Duration;

use common::{plan, plan_with};
use venn::config::{ErrorInjectionConfig, SequencerConfig};
use venn::error::SequenceError;
use venn::models::{CardStatus, ThoughtStatus, ToolStatus};
use venn::sequencer::{Card, Event, Sequencer, Timeline};

const QUERIES: &[&str] = &[
    "Show me the opportunity for Green and Sons",
    "Check my inbox",
    "find the proposal file",
    "hello",
    "show me an error",
    "gateblock",
    "Can you update the Venn PRD in notion",
    "Check salesforce for at risk deals and update them, but I don't have access",
];

const SERVICES: &[&str] = &["salesforce", "notion", "gdrive", "gmail"];

/// Step through every event, checking invariants after each one.
#[test]
fn test_invariants_hold_at_every_step() {
    let errors = ErrorInjectionConfig::default().with_probability(0.5);
    for (seed, query) in QUERIES.iter().enumerate() {
        for final_reasoning in [true, false] {
            let plan = plan_with(query, SERVICES, errors.clone(), final_reasoning, seed as u64);
            let mut timeline = Timeline::new(plan, SequencerConfig::default());
            let mut last_status = timeline.thought().status;

            while let Some(result) = timeline.fire_next() {
                result.expect("scheduled events always apply");
                let thought = timeline.thought();

                // status never goes backwards
                assert!(thought.status >= last_status, "{query}");
                last_status = thought.status;

                // the final response only appears on completion
                assert_eq!(
                    thought.final_response.is_empty(),
                    thought.status != ThoughtStatus::Completed,
                    "{query}"
                );

                // at most one tool is loading, and only after its predecessors resolved
                let loading: Vec<usize> = thought
                    .tool_invocations
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.status == ToolStatus::Loading)
                    .map(|(i, _)| i)
                    .collect();
                assert!(loading.len() <= 1);
                if let Some(&i) = loading.first() {
                    assert!(thought.tool_invocations[..i]
                        .iter()
                        .all(|t| t.status.is_resolved()));
                }

                for tool in &thought.tool_invocations {
                    // a planned failure never shows as completed
                    if tool.error.is_some() {
                        assert_ne!(tool.status, ToolStatus::Completed);
                        assert_eq!(tool.result_count, 0);
                    }
                    if tool.status == ToolStatus::Error {
                        assert!(tool.error.is_some());
                    }
                }

                for update in thought.visible_progress_updates() {
                    assert_eq!(
                        thought.tool_invocations[update.tool_index].status,
                        ToolStatus::Completed
                    );
                }

                if thought.status >= ThoughtStatus::FinalReasoning {
                    assert_eq!(thought.resolved_tool_count(), thought.tool_invocations.len());
                }
            }

            let thought = timeline.thought();
            assert!(thought.is_completed(), "{query}");
            if let Some(reasoning) = &thought.final_reasoning {
                assert_eq!(reasoning.status, CardStatus::Completed);
            }
        }
    }
}

#[test]
fn test_error_cards_stay_expanded() {
    let errors = ErrorInjectionConfig::default().with_probability(1.0);
    let plan = plan_with("show me an error", &["gmail", "gdrive"], errors, true, 1);
    let mut timeline = Timeline::new(plan, SequencerConfig::default());
    timeline.run_to_end().unwrap();

    for tool in &timeline.thought().tool_invocations {
        assert_eq!(tool.status, ToolStatus::Error);
        assert!(tool.is_expanded);
    }
}

#[test]
fn test_final_response_reflects_resolved_tools() {
    // trigger term present, but nothing actually fails
    let plan = plan_with(
        "hello, any error?",
        &["gmail", "gdrive"],
        ErrorInjectionConfig::disabled(),
        true,
        1,
    );
    let mut timeline = Timeline::new(plan, SequencerConfig::instant());
    timeline.run_to_end().unwrap();
    let thought = timeline.thought();
    assert!(thought
        .tool_invocations
        .iter()
        .all(|t| t.status == ToolStatus::Completed));
    assert!(!thought.final_response.contains("could not be reached"));

    // every CRM tool fails
    let plan = plan_with(
        "deal status? I get access error",
        &["salesforce", "gmail"],
        ErrorInjectionConfig::default().with_probability(1.0),
        true,
        1,
    );
    let mut timeline = Timeline::new(plan, SequencerConfig::instant());
    timeline.run_to_end().unwrap();
    let thought = timeline.thought();
    assert!(thought
        .tool_invocations
        .iter()
        .all(|t| t.status == ToolStatus::Error));
    assert!(!thought.final_response.contains("comprehensive information"));
    assert!(thought.final_response.contains("None of the selected data sources"));
}

#[test]
fn test_completed_cards_collapse_after_delay() {
    let mut timeline = Timeline::new(plan("hello", &["gmail"], true), SequencerConfig::default());
    // tool 0 completes at 5500 and collapses 3000 later
    timeline.advance_to(Duration::from_millis(8499)).unwrap();
    assert!(timeline.thought().tool_invocations[0].is_expanded);
    timeline.advance_to(Duration::from_millis(8500)).unwrap();
    assert!(!timeline.thought().tool_invocations[0].is_expanded);
}

#[test]
fn test_manual_toggle_suppresses_auto_collapse() {
    let mut timeline = Timeline::new(plan("hello", &["gmail"], true), SequencerConfig::default());
    timeline.advance_to(Duration::from_millis(6000)).unwrap();

    // collapse and re-open by hand before the timer fires
    timeline.toggle(Card::Tool(0)).unwrap();
    timeline.toggle(Card::Tool(0)).unwrap();
    let fired = timeline.run_to_end().unwrap();

    assert!(fired
        .iter()
        .any(|(_, e)| *e == Event::AutoCollapse(Card::Tool(0))));
    assert!(timeline.thought().tool_invocations[0].is_expanded);
    // the final reasoning card was never touched
    assert!(!timeline.thought().final_reasoning.as_ref().unwrap().is_expanded);
}

#[test]
fn test_toggle_final_reasoning_before_it_runs() {
    let mut timeline = Timeline::new(plan("hello", &["gmail"], true), SequencerConfig::default());
    assert!(matches!(
        timeline.toggle(Card::FinalReasoning),
        Err(SequenceError::CardPending { .. })
    ));

    let mut timeline = Timeline::new(plan("hello", &["gmail"], false), SequencerConfig::default());
    assert_eq!(
        timeline.toggle(Card::FinalReasoning),
        Err(SequenceError::MissingFinalReasoning)
    );
}

#[tokio::test(start_paused = true)]
async fn test_driver_matches_virtual_timeline() {
    let query = "Can you update the Venn PRD in notion";
    let handle = Sequencer::spawn(plan(query, &["notion"], true), SequencerConfig::default());
    let mut rx = handle.subscribe();

    let mut statuses = vec![rx.borrow().status];
    while !rx.borrow().is_completed() {
        rx.changed().await.unwrap();
        let status = rx.borrow().status;
        if statuses.last() != Some(&status) {
            statuses.push(status);
        }
    }

    assert_eq!(
        statuses,
        vec![
            ThoughtStatus::Initializing,
            ThoughtStatus::Reasoning,
            ThoughtStatus::InvokingTools,
            ThoughtStatus::FinalReasoning,
            ThoughtStatus::Completed,
        ]
    );

    let mut timeline = Timeline::new(plan(query, &["notion"], true), SequencerConfig::default());
    let fired = timeline.run_to_end().unwrap();
    let completed_at = fired
        .iter()
        .find(|(_, e)| *e == Event::Complete)
        .map(|(t, _)| *t)
        .unwrap();
    // 800 + 1200 + (1500+2000) + (2300+2000) + (3100+2000) + 1000 + 2500 + 1000
    assert_eq!(completed_at, Duration::from_millis(19400));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_sequence() {
    let handle = Sequencer::spawn(plan("hello", &["gmail"], true), SequencerConfig::default());
    let rx = handle.subscribe();
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(rx.borrow().status, ThoughtStatus::InvokingTools);

    drop(handle);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(rx.borrow().status, ThoughtStatus::InvokingTools);
    assert!(rx.has_changed().is_err());
}
