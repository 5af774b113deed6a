/*!
 * Parser Types
 * Pipelines, stages and input caps
 */

use crate::core::limits::{MAX_ARGS, MAX_LINE_COMMAND};
use std::path::PathBuf;

/// Input caps applied while scanning a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_args: usize,
    pub max_line: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_args: MAX_ARGS,
            max_line: MAX_LINE_COMMAND,
        }
    }
}

/// One pipeline stage: an argument vector whose first element names the program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub args: Vec<String>,
}

impl Stage {
    /// A stage with no tokens keeps a single empty argument
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        if tokens.is_empty() {
            Self {
                args: vec![String::new()],
            }
        } else {
            Self { args: tokens }
        }
    }

    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn is_blank(&self) -> bool {
        self.program().is_empty()
    }
}

/// A parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
    pub background: bool,
    pub respawnable: bool,
    /// Output file of the last stage
    pub redirect: Option<PathBuf>,
    /// Watchdog seconds, 0 when none
    pub timeout: u64,
}

impl Pipeline {
    /// Parse with the default input caps
    pub fn parse(input: &str) -> Self {
        Self::parse_with(input, ParseLimits::default())
    }

    pub fn parse_with(input: &str, limits: ParseLimits) -> Self {
        super::tokenizer::scan(input, limits)
    }

    pub fn is_foreground(&self) -> bool {
        !self.background
    }

    /// Nothing to launch: a single stage holding only the empty argument
    pub fn is_empty(&self) -> bool {
        self.stages.len() == 1 && self.stages[0].is_blank() && self.stages[0].argc() == 1
    }

    pub fn program(&self) -> &str {
        self.stages.first().map(Stage::program).unwrap_or("")
    }

    pub fn first_args(&self) -> &[String] {
        self.stages.first().map(|s| s.args.as_slice()).unwrap_or(&[])
    }
}
