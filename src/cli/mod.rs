//! CLI module for Venn.
//!
//! - Argument parsing
//! - Version display
//! - The terminal demo
//!
//! `main` parses the arguments and hands the command to [`run_cli_command`]
//! unless it is [`CliCommand::Serve`]:
//!
//! ```ignore
//! use venn::cli::{parse_args, run_cli_command, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Serve => { /* start the API */ }
//!     command => run_cli_command(command, &config).await?,
//! }
//! ```

pub mod args;
pub mod demo;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use demo::run_demo;
pub use version::{version_line, VERSION};

use color_eyre::Result;

use crate::config::AppConfig;

/// Run a non-server command.
///
/// `Serve` is a no-op here; `main` owns the server lifecycle.
pub async fn run_cli_command(command: CliCommand, config: &AppConfig) -> Result<()> {
    match command {
        CliCommand::Version => println!("{}", version_line()),
        CliCommand::Help => println!("{}", USAGE),
        CliCommand::Demo { query, services } => run_demo(config, &query, services).await?,
        CliCommand::Serve => {}
    }
    Ok(())
}
