//! Stage state machine.
//!
//! [`apply`] is the pure transition function: it validates an [`Event`]
//! against the current [`SequenceState`], mutates the thought process and
//! returns the follow-up events with their delays. It never looks at a
//! clock; scheduling belongs to [`super::Timeline`].

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::config::SequencerConfig;
use crate::error::SequenceError;
use crate::generator::Plan;
use crate::models::{CardStatus, ThoughtProcess, ThoughtStatus, ToolStatus};

/// A collapsible card in the thought process view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Card {
    Tool(usize),
    FinalReasoning,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Tool(index) => write!(f, "tool-{index}"),
            Card::FinalReasoning => write!(f, "final-reasoning"),
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    BeginReasoning,
    BeginTools,
    StartTool(usize),
    ResolveTool(usize),
    BeginFinalReasoning,
    FinishFinalReasoning,
    Complete,
    /// Timer-driven collapse of a completed card
    AutoCollapse(Card),
    /// User expand/collapse
    Toggle(Card),
}

impl Event {
    /// Stage events move the overall sequence forward; the rest only touch
    /// card display state.
    pub fn is_stage(self) -> bool {
        !matches!(self, Event::AutoCollapse(_) | Event::Toggle(_))
    }
}

/// An event to fire `delay` after the one that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub delay: Duration,
    pub event: Event,
}

impl Scheduled {
    fn after(delay: Duration, event: Event) -> Self {
        Self { delay, event }
    }
}

/// The plan being replayed plus display bookkeeping
#[derive(Debug, Clone)]
pub struct SequenceState {
    plan: Plan,
    /// Cards the user toggled after they completed; auto-collapse skips them
    touched: HashSet<Card>,
}

impl SequenceState {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            touched: HashSet::new(),
        }
    }

    pub fn thought(&self) -> &ThoughtProcess {
        &self.plan.thought
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }
}

/// Events to schedule when a sequence starts.
pub fn initial_events(config: &SequencerConfig) -> Vec<Scheduled> {
    vec![Scheduled::after(config.reasoning_delay, Event::BeginReasoning)]
}

/// Apply `event` to `state`.
///
/// On error the state is unchanged.
pub fn apply(
    state: &mut SequenceState,
    config: &SequencerConfig,
    event: Event,
) -> Result<Vec<Scheduled>, SequenceError> {
    match event {
        Event::BeginReasoning => {
            expect_status(state, event, ThoughtStatus::Initializing)?;
            state.plan.thought.status = ThoughtStatus::Reasoning;
            Ok(vec![Scheduled::after(config.tools_delay, Event::BeginTools)])
        }
        Event::BeginTools => {
            expect_status(state, event, ThoughtStatus::Reasoning)?;
            state.plan.thought.status = ThoughtStatus::InvokingTools;
            if state.thought().tool_invocations.is_empty() {
                Ok(vec![after_tools(state, config)])
            } else {
                Ok(vec![Scheduled::after(
                    config.tool_start_delay(0),
                    Event::StartTool(0),
                )])
            }
        }
        Event::StartTool(index) => start_tool(state, config, event, index),
        Event::ResolveTool(index) => resolve_tool(state, config, event, index),
        Event::BeginFinalReasoning => {
            expect_status(state, event, ThoughtStatus::InvokingTools)?;
            expect_tools_resolved(state, event)?;
            let thought = &mut state.plan.thought;
            let reasoning = thought
                .final_reasoning
                .as_mut()
                .ok_or(SequenceError::MissingFinalReasoning)?;
            reasoning.status = CardStatus::Loading;
            thought.status = ThoughtStatus::FinalReasoning;
            Ok(vec![Scheduled::after(
                config.final_reasoning_run,
                Event::FinishFinalReasoning,
            )])
        }
        Event::FinishFinalReasoning => {
            expect_status(state, event, ThoughtStatus::FinalReasoning)?;
            let reasoning = state
                .plan
                .thought
                .final_reasoning
                .as_mut()
                .ok_or(SequenceError::MissingFinalReasoning)?;
            if reasoning.status != CardStatus::Loading {
                return Err(invalid(event, ThoughtStatus::FinalReasoning));
            }
            reasoning.status = CardStatus::Completed;
            state.touched.remove(&Card::FinalReasoning);

            let mut next = Vec::with_capacity(2);
            if reasoning.is_expanded {
                next.push(Scheduled::after(
                    config.final_reasoning_collapse,
                    Event::AutoCollapse(Card::FinalReasoning),
                ));
            }
            next.push(Scheduled::after(config.completion_delay, Event::Complete));
            Ok(next)
        }
        Event::Complete => {
            let status = state.thought().status;
            let ready = match status {
                ThoughtStatus::InvokingTools => {
                    state.thought().final_reasoning.is_none() && all_tools_resolved(state)
                }
                ThoughtStatus::FinalReasoning => state
                    .thought()
                    .final_reasoning
                    .as_ref()
                    .is_some_and(|r| r.status == CardStatus::Completed),
                _ => false,
            };
            if !ready {
                return Err(invalid(event, status));
            }
            let response = state.plan.compose_final_response();
            let thought = &mut state.plan.thought;
            thought.final_response = response;
            thought.status = ThoughtStatus::Completed;
            Ok(Vec::new())
        }
        Event::AutoCollapse(card) => {
            check_card(state, card)?;
            if !state.touched.contains(&card) && card_completed(state, card) {
                set_expanded(state, card, false);
            }
            Ok(Vec::new())
        }
        Event::Toggle(card) => {
            check_card(state, card)?;
            if card_pending(state, card) {
                return Err(SequenceError::CardPending {
                    card: card.to_string(),
                });
            }
            let expanded = card_expanded(state, card);
            set_expanded(state, card, !expanded);
            if card_resolved(state, card) {
                state.touched.insert(card);
            }
            Ok(Vec::new())
        }
    }
}

fn start_tool(
    state: &mut SequenceState,
    config: &SequencerConfig,
    event: Event,
    index: usize,
) -> Result<Vec<Scheduled>, SequenceError> {
    expect_status(state, event, ThoughtStatus::InvokingTools)?;
    let tools = &state.thought().tool_invocations;
    let tool = tools.get(index).ok_or(SequenceError::ToolIndexOutOfRange {
        index,
        len: tools.len(),
    })?;
    if tool.status != ToolStatus::Pending {
        return Err(not_ready(index, "start", tool.status));
    }
    // Tools run one at a time, in plan order.
    if let Some(previous) = index.checked_sub(1).map(|i| &tools[i]) {
        if !previous.status.is_resolved() {
            return Err(not_ready(index - 1, "hand over", previous.status));
        }
    }

    state.plan.thought.tool_invocations[index].status = ToolStatus::Loading;
    Ok(vec![Scheduled::after(
        config.tool_run,
        Event::ResolveTool(index),
    )])
}

fn resolve_tool(
    state: &mut SequenceState,
    config: &SequencerConfig,
    event: Event,
    index: usize,
) -> Result<Vec<Scheduled>, SequenceError> {
    expect_status(state, event, ThoughtStatus::InvokingTools)?;
    let len = state.thought().tool_invocations.len();
    let tool = state
        .plan
        .thought
        .tool_invocations
        .get_mut(index)
        .ok_or(SequenceError::ToolIndexOutOfRange { index, len })?;
    if tool.status != ToolStatus::Loading {
        return Err(not_ready(index, "resolve", tool.status));
    }

    let mut next = Vec::with_capacity(2);
    if tool.will_fail() {
        tool.status = ToolStatus::Error;
    } else {
        tool.status = ToolStatus::Completed;
        if tool.is_expanded {
            next.push(Scheduled::after(
                config.tool_collapse,
                Event::AutoCollapse(Card::Tool(index)),
            ));
        }
    }
    state.touched.remove(&Card::Tool(index));

    if index + 1 < len {
        next.push(Scheduled::after(
            config.tool_start_delay(index + 1),
            Event::StartTool(index + 1),
        ));
    } else {
        next.push(after_tools(state, config));
    }
    Ok(next)
}

fn after_tools(state: &SequenceState, config: &SequencerConfig) -> Scheduled {
    let event = if state.thought().final_reasoning.is_some() {
        Event::BeginFinalReasoning
    } else {
        Event::Complete
    };
    Scheduled::after(config.after_tools, event)
}

fn invalid(event: Event, status: ThoughtStatus) -> SequenceError {
    SequenceError::InvalidTransition {
        event: format!("{event:?}"),
        status,
    }
}

fn not_ready(index: usize, action: &'static str, status: ToolStatus) -> SequenceError {
    SequenceError::ToolNotReady {
        index,
        action,
        status: format!("{status:?}").to_lowercase(),
    }
}

fn expect_status(
    state: &SequenceState,
    event: Event,
    expected: ThoughtStatus,
) -> Result<(), SequenceError> {
    let status = state.thought().status;
    if status == expected {
        Ok(())
    } else {
        Err(invalid(event, status))
    }
}

fn all_tools_resolved(state: &SequenceState) -> bool {
    state
        .thought()
        .tool_invocations
        .iter()
        .all(|tool| tool.status.is_resolved())
}

fn expect_tools_resolved(state: &SequenceState, event: Event) -> Result<(), SequenceError> {
    if all_tools_resolved(state) {
        Ok(())
    } else {
        Err(invalid(event, state.thought().status))
    }
}

fn check_card(state: &SequenceState, card: Card) -> Result<(), SequenceError> {
    match card {
        Card::Tool(index) => {
            let len = state.thought().tool_invocations.len();
            if index < len {
                Ok(())
            } else {
                Err(SequenceError::ToolIndexOutOfRange { index, len })
            }
        }
        Card::FinalReasoning => state
            .thought()
            .final_reasoning
            .as_ref()
            .map(|_| ())
            .ok_or(SequenceError::MissingFinalReasoning),
    }
}

// The card helpers below assume `check_card` already passed.

fn card_pending(state: &SequenceState, card: Card) -> bool {
    match card {
        Card::Tool(i) => state.thought().tool_invocations[i].status == ToolStatus::Pending,
        Card::FinalReasoning => state
            .thought()
            .final_reasoning
            .as_ref()
            .is_some_and(|r| r.status == CardStatus::Pending),
    }
}

fn card_completed(state: &SequenceState, card: Card) -> bool {
    match card {
        Card::Tool(i) => state.thought().tool_invocations[i].status == ToolStatus::Completed,
        Card::FinalReasoning => state
            .thought()
            .final_reasoning
            .as_ref()
            .is_some_and(|r| r.status == CardStatus::Completed),
    }
}

fn card_resolved(state: &SequenceState, card: Card) -> bool {
    match card {
        Card::Tool(i) => state.thought().tool_invocations[i].status.is_resolved(),
        Card::FinalReasoning => card_completed(state, card),
    }
}

fn card_expanded(state: &SequenceState, card: Card) -> bool {
    match card {
        Card::Tool(i) => state.thought().tool_invocations[i].is_expanded,
        Card::FinalReasoning => state
            .thought()
            .final_reasoning
            .as_ref()
            .is_some_and(|r| r.is_expanded),
    }
}

fn set_expanded(state: &mut SequenceState, card: Card, expanded: bool) {
    let thought = &mut state.plan.thought;
    match card {
        Card::Tool(i) => thought.tool_invocations[i].is_expanded = expanded,
        Card::FinalReasoning => {
            if let Some(reasoning) = thought.final_reasoning.as_mut() {
                reasoning.is_expanded = expanded;
            }
        }
    }
}
