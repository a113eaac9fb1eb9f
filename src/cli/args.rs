//! Command-line argument parsing for the Venn CLI.
//!
//! ```text
//! venn                                  serve the HTTP API (default)
//! venn serve
//! venn demo <query...> [--services a,b] run one query in the terminal
//! venn --version | -V
//! venn --help | -h
//! ```

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Run the HTTP API (default)
    Serve,
    /// Replay one query's thought process on stdout
    Demo {
        query: String,
        /// `None` uses the default selection
        services: Option<Vec<String>>,
    },
    /// Show version information
    Version,
    /// Show usage
    Help,
}

pub const USAGE: &str = "\
Usage:
  venn [serve]                              Serve the message log API
  venn demo <query...> [--services a,b,c]   Run a query and print each stage
  venn --version                            Show version
  venn --help                               Show this help";

/// Parse command-line arguments (program name first).
///
/// Unknown flags are ignored. `demo` without a query falls back to help.
///
/// # Examples
///
/// ```
/// use venn::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["venn".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1);

    let Some(first) = args.next() else {
        return CliCommand::Serve;
    };

    match first.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "demo" => parse_demo(args),
        _ => {
            // "serve" or stray flags: still look for version/help later on
            for arg in args {
                match arg.as_str() {
                    "--version" | "-V" => return CliCommand::Version,
                    "--help" | "-h" => return CliCommand::Help,
                    _ => {}
                }
            }
            CliCommand::Serve
        }
    }
}

fn parse_demo<I>(mut args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut words = Vec::new();
    let mut services = None;

    while let Some(arg) = args.next() {
        if arg == "--services" || arg == "-s" {
            if let Some(list) = args.next() {
                services = Some(split_services(&list));
            }
        } else if let Some(list) = arg.strip_prefix("--services=") {
            services = Some(split_services(list));
        } else if arg.starts_with("--") {
            // ignore unknown flags
        } else {
            words.push(arg);
        }
    }

    let query = words.join(" ");
    if query.trim().is_empty() {
        return CliCommand::Help;
    }
    CliCommand::Demo { query, services }
}

fn split_services(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}
