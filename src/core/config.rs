/*!
 * Shell Configuration
 * Runtime settings with environment overrides
 */

use super::limits::{DEFAULT_PROMPT, MAX_ARGS, MAX_LINE_COMMAND, ROTATION_QUANTUM};
use crate::parser::ParseLimits;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Shell settings
///
/// Environment variables read by [`ShellConfig::from_env`]:
/// - JOBSH_PROMPT: prompt text (default: `SHELL > `)
/// - JOBSH_MAX_ARGS: per-stage argument cap (default: 32)
/// - JOBSH_MAX_LINE: command line cap in bytes (default: 256)
/// - JOBSH_ROTATION_MS: round-robin quantum in milliseconds (default: 1000)
/// - JOBSH_TRACE_JSON: emit JSON logs on stderr (default: false)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    pub max_args: usize,
    pub max_line: usize,
    pub rotation_quantum: Duration,
    pub trace_json: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_args: MAX_ARGS,
            max_line: MAX_LINE_COMMAND,
            rotation_quantum: ROTATION_QUANTUM,
            trace_json: false,
        }
    }
}

impl ShellConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any JOBSH_* variables that are set
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(prompt) = env::var("JOBSH_PROMPT") {
            config.prompt = prompt;
        }
        if let Some(max_args) = env_parse::<usize>("JOBSH_MAX_ARGS").filter(|n| *n > 0) {
            config.max_args = max_args;
        }
        if let Some(max_line) = env_parse::<usize>("JOBSH_MAX_LINE").filter(|n| *n > 0) {
            config.max_line = max_line;
        }
        if let Some(millis) = env_parse::<u64>("JOBSH_ROTATION_MS").filter(|n| *n > 0) {
            config.rotation_quantum = Duration::from_millis(millis);
        }
        config.trace_json = env::var("JOBSH_TRACE_JSON")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        config
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_limits(mut self, max_args: usize, max_line: usize) -> Self {
        self.max_args = max_args;
        self.max_line = max_line;
        self
    }

    pub fn with_rotation_quantum(mut self, quantum: Duration) -> Self {
        self.rotation_quantum = quantum;
        self
    }

    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            max_args: self.max_args,
            max_line: self.max_line,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
