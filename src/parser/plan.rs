/*!
 * Launch Plans
 * Launch-modifier prefixes that change how a job is started
 */

use crate::core::{ShellError, ShellResult};

/// How a job's processes are started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPlan {
    Plain,
    /// `rr <n> cmd`: n duplicated pipelines sharing one time slice
    RoundRobin { replicas: usize },
    /// `timeout <s> cmd`: the group is terminated after s seconds
    Timed { seconds: u64 },
}

impl LaunchPlan {
    pub const ROUND_ROBIN: &'static str = "rr";
    pub const TIMEOUT: &'static str = "timeout";

    /// Recognize a launch-modifier prefix on the first stage's arguments
    pub fn parse(args: &[String]) -> ShellResult<Self> {
        match args.first().map(String::as_str) {
            Some(Self::ROUND_ROBIN) => {
                let usage = || ShellError::Usage("usage: rr <replicas> <command>".into());
                let replicas: usize = prefix_count(args).ok_or_else(usage)?;
                if replicas == 0 {
                    return Err(ShellError::InvalidArgument(
                        "round-robin needs at least one replica".into(),
                    ));
                }
                Ok(Self::RoundRobin { replicas })
            }
            Some(Self::TIMEOUT) => {
                let usage = || ShellError::Usage("usage: timeout <seconds> <command>".into());
                let seconds: u64 = prefix_count(args).ok_or_else(usage)?;
                if seconds == 0 {
                    return Err(ShellError::InvalidArgument(
                        "timeout must be at least one second".into(),
                    ));
                }
                Ok(Self::Timed { seconds })
            }
            _ => Ok(Self::Plain),
        }
    }

    /// Number of leading arguments the plan consumes
    pub fn prefix_len(&self) -> usize {
        match self {
            Self::Plain => 0,
            Self::RoundRobin { .. } | Self::Timed { .. } => 2,
        }
    }
}

fn prefix_count<T: std::str::FromStr>(args: &[String]) -> Option<T> {
    if args.len() < 3 || args[2].is_empty() {
        return None;
    }
    args[1].parse().ok()
}
