//! Virtual-clock scheduler over the state machine.
//!
//! Events are queued by due time, ties broken by insertion order, and fired
//! in that order. Nothing here sleeps; the async driver and the tests decide
//! how the clock moves.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use super::machine::{apply, initial_events, Card, Event, Scheduled, SequenceState};
use crate::config::SequencerConfig;
use crate::error::SequenceError;
use crate::generator::Plan;
use crate::models::ThoughtProcess;

#[derive(Debug, Clone)]
struct Entry {
    due: Duration,
    seq: u64,
    event: Event,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// A sequence replayed against a virtual clock starting at zero
#[derive(Debug, Clone)]
pub struct Timeline {
    state: SequenceState,
    config: SequencerConfig,
    now: Duration,
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Timeline {
    pub fn new(plan: Plan, config: SequencerConfig) -> Self {
        let mut timeline = Self {
            state: SequenceState::new(plan),
            config,
            now: Duration::ZERO,
            queue: BinaryHeap::new(),
            next_seq: 0,
        };
        let initial = initial_events(&timeline.config);
        timeline.schedule(initial);
        timeline
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn thought(&self) -> &ThoughtProcess {
        self.state.thought()
    }

    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    /// Due time of the next queued event
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Nothing left to fire
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Fire the earliest queued event, moving the clock to its due time.
    pub fn fire_next(&mut self) -> Option<Result<Event, SequenceError>> {
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(self.fire(entry.event))
    }

    /// Fire everything due at or before `at`, then move the clock to `at`.
    pub fn advance_to(&mut self, at: Duration) -> Result<Vec<Event>, SequenceError> {
        let mut fired = Vec::new();
        while self.next_due().is_some_and(|due| due <= at) {
            if let Some(result) = self.fire_next() {
                fired.push(result?);
            }
        }
        self.now = self.now.max(at);
        Ok(fired)
    }

    pub fn advance_by(&mut self, delta: Duration) -> Result<Vec<Event>, SequenceError> {
        self.advance_to(self.now + delta)
    }

    /// Drain the queue, returning every event fired with its time.
    pub fn run_to_end(&mut self) -> Result<Vec<(Duration, Event)>, SequenceError> {
        let mut fired = Vec::new();
        while let Some(result) = self.fire_next() {
            fired.push((self.now, result?));
        }
        Ok(fired)
    }

    /// Apply a user toggle at the current virtual time.
    pub fn toggle(&mut self, card: Card) -> Result<(), SequenceError> {
        self.fire(Event::Toggle(card)).map(|_| ())
    }

    fn fire(&mut self, event: Event) -> Result<Event, SequenceError> {
        let next = apply(&mut self.state, &self.config, event)?;
        self.schedule(next);
        Ok(event)
    }

    fn schedule(&mut self, events: Vec<Scheduled>) {
        for Scheduled { delay, event } in events {
            self.queue.push(Reverse(Entry {
                due: self.now + delay,
                seq: self.next_seq,
                event,
            }));
            self.next_seq += 1;
        }
    }
}
