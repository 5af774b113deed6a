/*!
 * Error Types
 * Shell error taxonomy with thiserror and miette diagnostics
 */

use miette::Diagnostic;
use nix::errno::Errno;
use thiserror::Error;

/// Result alias used across the shell
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors raised by the shell engine and its built-ins
///
/// The `Display` text of the job-control variants is the exact message the
/// shell prints for them.
#[derive(Error, Debug, Diagnostic)]
pub enum ShellError {
    #[error("standard input is not attached to a terminal")]
    #[diagnostic(
        code(terminal::not_a_tty),
        help("Job control needs an interactive terminal. Run jobsh from a terminal session.")
    )]
    NotATerminal,

    #[error("terminal control failed: {0}")]
    #[diagnostic(
        code(terminal::control_failed),
        help("The shell could not claim or configure the controlling terminal.")
    )]
    Terminal(#[source] Errno),

    #[error("{0}")]
    #[diagnostic(code(builtin::usage))]
    Usage(String),

    #[error("No pending jobs.")]
    #[diagnostic(code(jobs::none_pending))]
    NoPendingJobs,

    #[error("No pending job matches number {0}.")]
    #[diagnostic(code(jobs::no_such_job))]
    NoSuchJob(usize),

    #[error("Job already running.")]
    #[diagnostic(code(jobs::already_running))]
    JobAlreadyRunning,

    #[error("A round-robin job cannot be brought to the foreground.")]
    #[diagnostic(
        code(jobs::round_robin_foreground),
        help("Round-robin jobs are driven by the rotation timer and always stay in the background.")
    )]
    RoundRobinForeground,

    #[error("job {0} is no longer tracked")]
    #[diagnostic(code(jobs::unknown))]
    UnknownJob(u64),

    #[error("invalid argument: {0}")]
    #[diagnostic(code(builtin::invalid_argument))]
    InvalidArgument(String),

    #[error("pipe creation failed: {0}")]
    #[diagnostic(
        code(launch::pipe_failed),
        help("The process may have run out of file descriptors.")
    )]
    Pipe(#[source] Errno),

    #[error("fork failed: {0}")]
    #[diagnostic(
        code(launch::fork_failed),
        help("Check system resources and the per-user process limit.")
    )]
    Fork(#[source] Errno),

    #[error("signal delivery failed: {0}")]
    #[diagnostic(code(signals::delivery_failed))]
    Signal(#[source] Errno),

    #[error("I/O error: {0}")]
    #[diagnostic(code(shell::io))]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Whether the error prevents the shell from starting at all
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotATerminal | Self::Terminal(_))
    }
}
