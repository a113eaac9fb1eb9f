//! Error handling for Venn.
//!
//! Simulated tool failures are *data* (see [`crate::models::ToolError`]) and
//! never surface here. This module covers the genuine failure paths:
//!
//! - **Sequencer errors**: events rejected by the stage state machine
//! - **Storage errors**: the in-memory message/user store
//! - **Config errors**: malformed environment configuration
//! - **API errors**: mapped onto HTTP status codes with canned bodies
//!
//! Each module returns its own error type; the binary wraps everything in
//! `color_eyre::Result`.

mod api;
mod config;
mod sequence;
mod storage;

pub use api::ApiError;
pub use config::ConfigError;
pub use sequence::SequenceError;
pub use storage::StorageError;
