//! Runtime configuration.
//!
//! Three independent pieces, each with builder-style setters:
//!
//! - [`ServerConfig`]: where the message log API listens
//! - [`SequencerConfig`]: the stage delay table
//! - [`ErrorInjectionConfig`]: trigger terms and failure probability for
//!   simulated tool errors
//!
//! [`AppConfig::from_env`] reads overrides from `VENN_*` environment
//! variables.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::ToolErrorKind;

/// Listening address and HTTP options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host (default: 127.0.0.1)
    pub host: String,
    /// Bind port (default: 5000, 0 picks an ephemeral port)
    pub port: u16,
    /// Attach a permissive CORS layer
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// `host:port` suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Longest single stage delay a scaled configuration may carry (one day).
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// `delay * factor`, or `None` if it overflows or exceeds [`MAX_DELAY`].
fn scale_delay(delay: Duration, factor: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor)
        .ok()
        .filter(|scaled| *scaled <= MAX_DELAY)
}

/// Delay table driving the stage sequencer.
///
/// Only the order of stages is load-bearing; the durations are presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    /// initializing -> reasoning
    pub reasoning_delay: Duration,
    /// reasoning -> invoking-tools
    pub tools_delay: Duration,
    /// Wait before tool 0 starts loading
    pub tool_start_base: Duration,
    /// Extra wait per tool position
    pub tool_start_step: Duration,
    /// loading -> completed/error
    pub tool_run: Duration,
    /// Last tool resolved -> next stage
    pub after_tools: Duration,
    /// Final reasoning loading -> completed
    pub final_reasoning_run: Duration,
    /// Final reasoning completed -> completed
    pub completion_delay: Duration,
    /// Completed tool card auto-collapse
    pub tool_collapse: Duration,
    /// Completed final reasoning card auto-collapse
    pub final_reasoning_collapse: Duration,
    /// Whether generated plans carry a final reasoning block
    pub include_final_reasoning: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            reasoning_delay: Duration::from_millis(800),
            tools_delay: Duration::from_millis(1200),
            tool_start_base: Duration::from_millis(1500),
            tool_start_step: Duration::from_millis(800),
            tool_run: Duration::from_millis(2000),
            after_tools: Duration::from_millis(1000),
            final_reasoning_run: Duration::from_millis(2500),
            completion_delay: Duration::from_millis(1000),
            tool_collapse: Duration::from_millis(3000),
            final_reasoning_collapse: Duration::from_millis(4000),
            include_final_reasoning: true,
        }
    }
}

impl SequencerConfig {
    /// Every delay zero: the whole sequence fires at t=0 in order.
    pub fn instant() -> Self {
        Self::default().scaled(0.0)
    }

    /// Wait before the tool at `index` starts loading.
    pub fn tool_start_delay(&self, index: usize) -> Duration {
        let step = u32::try_from(index).unwrap_or(u32::MAX);
        self.tool_start_base + self.tool_start_step.saturating_mul(step)
    }

    /// Multiply every delay by `factor`. Negative or non-finite factors are
    /// treated as zero; products past [`MAX_DELAY`] saturate to it.
    pub fn scaled(mut self, factor: f64) -> Self {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 0.0 };
        for delay in self.delays_mut() {
            *delay = scale_delay(*delay, factor).unwrap_or(MAX_DELAY);
        }
        self
    }

    /// Like [`SequencerConfig::scaled`], but `None` when the factor is
    /// negative, non-finite, or pushes any delay past [`MAX_DELAY`].
    pub fn try_scaled(mut self, factor: f64) -> Option<Self> {
        if !factor.is_finite() || factor < 0.0 {
            return None;
        }
        for delay in self.delays_mut() {
            *delay = scale_delay(*delay, factor)?;
        }
        Some(self)
    }

    fn delays_mut(&mut self) -> [&mut Duration; 10] {
        [
            &mut self.reasoning_delay,
            &mut self.tools_delay,
            &mut self.tool_start_base,
            &mut self.tool_start_step,
            &mut self.tool_run,
            &mut self.after_tools,
            &mut self.final_reasoning_run,
            &mut self.completion_delay,
            &mut self.tool_collapse,
            &mut self.final_reasoning_collapse,
        ]
    }

    pub fn with_final_reasoning(mut self, include: bool) -> Self {
        self.include_final_reasoning = include;
        self
    }
}

/// Keyword triggers and odds for simulated tool failures
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInjectionConfig {
    /// Chance that each generic tool fails when a trigger is present
    pub probability: f64,
    pub runtime_triggers: Vec<String>,
    pub access_triggers: Vec<String>,
    pub platform_triggers: Vec<String>,
}

impl Default for ErrorInjectionConfig {
    fn default() -> Self {
        Self {
            probability: 0.5,
            runtime_triggers: vec!["error".to_string()],
            access_triggers: vec!["access".to_string()],
            platform_triggers: vec!["gateblock".to_string()],
        }
    }
}

impl ErrorInjectionConfig {
    /// Never inject failures.
    pub fn disabled() -> Self {
        Self::default().with_probability(0.0)
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Error kind selected by the query's trigger terms.
    /// Precedence: platform, then access, then runtime.
    pub fn kind_for(&self, query: &str) -> Option<ToolErrorKind> {
        let query = query.to_lowercase();
        if contains_any(&query, &self.platform_triggers) {
            Some(ToolErrorKind::Platform)
        } else if contains_any(&query, &self.access_triggers) {
            Some(ToolErrorKind::Access)
        } else if contains_any(&query, &self.runtime_triggers) {
            Some(ToolErrorKind::Runtime)
        } else {
            None
        }
    }

    /// Whether the query mentions an access trigger, regardless of precedence.
    pub fn mentions_access(&self, query: &str) -> bool {
        contains_any(&query.to_lowercase(), &self.access_triggers)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| haystack.contains(needle.to_lowercase().as_str()))
}

/// Everything the binary needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sequencer: SequencerConfig,
    pub errors: ErrorInjectionConfig,
}

impl AppConfig {
    /// Read overrides from the process environment.
    ///
    /// - `VENN_HOST`, `VENN_PORT`
    /// - `VENN_TIME_SCALE` multiplies every sequencer delay
    /// - `VENN_ERROR_PROBABILITY` in `0.0..=1.0`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("VENN_HOST") {
            config.server = config.server.with_host(host);
        }
        if let Some(port) = parse_var::<u16, _>(&lookup, "VENN_PORT")? {
            config.server = config.server.with_port(port);
        }
        if let Some(scale) = parse_var::<f64, _>(&lookup, "VENN_TIME_SCALE")? {
            if !scale.is_finite() || scale < 0.0 {
                return Err(ConfigError::invalid_env(
                    "VENN_TIME_SCALE",
                    scale.to_string(),
                    "must be a non-negative number",
                ));
            }
            config.sequencer = config.sequencer.try_scaled(scale).ok_or_else(|| {
                ConfigError::invalid_env(
                    "VENN_TIME_SCALE",
                    scale.to_string(),
                    "is too large, delays are capped at one day",
                )
            })?;
        }
        if let Some(probability) = parse_var::<f64, _>(&lookup, "VENN_ERROR_PROBABILITY")? {
            if !(0.0..=1.0).contains(&probability) {
                return Err(ConfigError::invalid_env(
                    "VENN_ERROR_PROBABILITY",
                    probability.to_string(),
                    "must be between 0 and 1",
                ));
            }
            config.errors = config.errors.with_probability(probability);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, variable: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::invalid_env(variable, raw.as_str(), e.to_string())),
    }
}
