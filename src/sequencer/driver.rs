//! Async driver: replays a [`Timeline`] against tokio time.
//!
//! One task per thought process. Snapshots are published on a watch
//! channel after every applied event and toggles come in over an mpsc
//! channel. Once the last event has fired the task parks the timeline in a
//! slot shared with the handle and exits; later toggles are applied by the
//! handle directly. Dropping the handle stops the sequence either way.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::machine::Card;
use super::timeline::Timeline;
use crate::config::SequencerConfig;
use crate::error::SequenceError;
use crate::generator::Plan;
use crate::models::ThoughtProcess;

enum Command {
    Toggle {
        card: Card,
        reply: oneshot::Sender<Result<(), SequenceError>>,
    },
}

/// A timeline with nothing left to fire, plus its snapshot channel.
struct Parked {
    timeline: Timeline,
    snapshot_tx: watch::Sender<ThoughtProcess>,
}

impl Parked {
    fn toggle(&mut self, card: Card) -> Result<(), SequenceError> {
        self.timeline.toggle(card)?;
        self.snapshot_tx.send_replace(self.timeline.thought().clone());
        Ok(())
    }
}

type ParkedSlot = Arc<Mutex<Option<Parked>>>;

/// Spawns sequencer tasks
pub struct Sequencer;

impl Sequencer {
    /// Start replaying `plan` on the current tokio runtime.
    pub fn spawn(plan: Plan, config: SequencerConfig) -> SequenceHandle {
        let timeline = Timeline::new(plan, config);
        let thought_id = timeline.thought().id.clone();
        let (snapshot_tx, snapshot_rx) = watch::channel(timeline.thought().clone());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let parked = ParkedSlot::default();

        let task = tokio::spawn(run_sequence(
            timeline,
            snapshot_tx,
            command_rx,
            Arc::clone(&parked),
        ));

        SequenceHandle {
            thought_id,
            snapshot_rx,
            command_tx,
            parked,
            task,
        }
    }
}

/// Owner of a sequence. Dropping it cancels the sequence.
pub struct SequenceHandle {
    thought_id: String,
    snapshot_rx: watch::Receiver<ThoughtProcess>,
    command_tx: mpsc::UnboundedSender<Command>,
    /// Filled by the task when it exits after the last event
    parked: ParkedSlot,
    task: JoinHandle<()>,
}

impl SequenceHandle {
    pub fn thought_id(&self) -> &str {
        &self.thought_id
    }

    /// Latest published state
    pub fn snapshot(&self) -> ThoughtProcess {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver notified after every applied event
    pub fn subscribe(&self) -> watch::Receiver<ThoughtProcess> {
        self.snapshot_rx.clone()
    }

    /// Expand or collapse a card.
    pub async fn toggle(&self, card: Card) -> Result<(), SequenceError> {
        let (reply, response) = oneshot::channel();
        match self.command_tx.send(Command::Toggle { card, reply }) {
            Ok(()) => response.await.map_err(|_| SequenceError::Cancelled)?,
            // the task is gone: either parked or cancelled
            Err(_) => self.toggle_parked(card),
        }
    }

    fn toggle_parked(&self, card: Card) -> Result<(), SequenceError> {
        let mut parked = self.parked.lock().unwrap_or_else(PoisonError::into_inner);
        let parked = parked.as_mut().ok_or(SequenceError::Cancelled)?;
        parked.toggle(card)?;
        debug!(thought_id = %self.thought_id, %card, "toggled card");
        Ok(())
    }

    /// Wait until the thought process reaches `completed`.
    pub async fn wait_completed(&self) -> Result<ThoughtProcess, SequenceError> {
        let mut rx = self.snapshot_rx.clone();
        let thought = rx
            .wait_for(ThoughtProcess::is_completed)
            .await
            .map_err(|_| SequenceError::Cancelled)?;
        Ok(thought.clone())
    }

    /// Whether the task has stopped, because the sequence was cancelled or
    /// because every event has fired
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the sequence. Pending events never fire and toggles report
    /// [`SequenceError::Cancelled`] from now on.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            debug!(thought_id = %self.thought_id, "cancelling sequence");
        }
        self.task.abort();
        self.parked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Drop for SequenceHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Task body. Runs until the queue is empty, then parks the timeline and
/// exits. Stops early if the handle goes away.
async fn run_sequence(
    mut timeline: Timeline,
    snapshot_tx: watch::Sender<ThoughtProcess>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    parked: ParkedSlot,
) {
    let started = Instant::now();
    let thought_id = timeline.thought().id.clone();
    debug!(thought_id = %thought_id, "sequence started");

    while let Some(due) = timeline.next_due() {
        tokio::select! {
            _ = tokio::time::sleep_until(started + due) => {
                let Some(result) = timeline.fire_next() else {
                    continue;
                };
                match result {
                    Ok(event) => {
                        debug!(
                            thought_id = %thought_id,
                            ?event,
                            status = ?timeline.thought().status,
                            "applied event"
                        );
                    }
                    Err(e) => {
                        warn!(thought_id = %thought_id, code = e.error_code(), "event rejected: {}", e);
                    }
                }
                snapshot_tx.send_replace(timeline.thought().clone());
            }
            command = command_rx.recv() => {
                match command {
                    Some(Command::Toggle { card, reply }) => {
                        // catch up with anything already due before toggling
                        if let Err(e) = timeline.advance_to(started.elapsed()) {
                            warn!(thought_id = %thought_id, "event rejected: {}", e);
                        }
                        let result = timeline.toggle(card);
                        if result.is_ok() {
                            debug!(thought_id = %thought_id, %card, "toggled card");
                        }
                        snapshot_tx.send_replace(timeline.thought().clone());
                        let _ = reply.send(result);
                    }
                    None => {
                        debug!(thought_id = %thought_id, "handle dropped, stopping sequence");
                        return;
                    }
                }
            }
        }
    }

    park(Parked { timeline, snapshot_tx }, command_rx, &parked);
    debug!(thought_id = %thought_id, "sequence idle, task exiting");
}

/// Hand the idle timeline to the handle. Toggles already queued are applied
/// here; the slot stays locked until they are, so a toggle that finds the
/// channel closed always finds the timeline parked.
fn park(mut idle: Parked, mut command_rx: mpsc::UnboundedReceiver<Command>, slot: &ParkedSlot) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    command_rx.close();
    while let Ok(Command::Toggle { card, reply }) = command_rx.try_recv() {
        let _ = reply.send(idle.toggle(card));
    }
    *slot = Some(idle);
}
