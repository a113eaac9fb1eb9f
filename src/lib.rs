//! Venn - a simulated enterprise assistant
//!
//! Generates staged "thought processes" for user queries, replays them
//! through a timed stage sequencer and serves a small message log API.
//! This library exposes modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod sequencer;
pub mod server;
pub mod session;
pub mod storage;

pub use config::AppConfig;
pub use session::ChatSession;
