//! Stage sequencer.
//!
//! Advances a generated thought process through
//! `initializing -> reasoning -> invoking-tools -> [final-reasoning] -> completed`,
//! running tools one at a time and auto-collapsing finished cards.
//!
//! - [`machine`]: pure transition function
//! - [`timeline`]: virtual-clock scheduler, usable without a runtime
//! - [`driver`]: tokio task publishing snapshots

pub mod driver;
pub mod machine;
pub mod timeline;

pub use driver::{SequenceHandle, Sequencer};
pub use machine::{apply, initial_events, Card, Event, Scheduled, SequenceState};
pub use timeline::Timeline;
