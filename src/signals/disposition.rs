/*!
 * Signal Dispositions
 * Job-control signals ignored by the shell and restored in its children
 */

use crate::core::{ShellError, ShellResult};
use nix::sys::signal::{signal, sigprocmask, SigHandler, SigSet, SigmaskHow, Signal};
use tracing::debug;

/// Signals the interactive shell must not be stopped or killed by
pub const JOB_CONTROL_SIGNALS: [Signal; 6] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
    Signal::SIGTERM,
];

/// Ignore the job-control signals in the shell process
pub fn ignore_job_control_signals() -> ShellResult<()> {
    for sig in JOB_CONTROL_SIGNALS {
        // SAFETY: SIG_IGN installs no handler code
        unsafe { signal(sig, SigHandler::SigIgn) }.map_err(ShellError::Signal)?;
    }
    debug!("job-control signals ignored");
    Ok(())
}

/// Restore default dispositions and an empty mask; runs in a forked child
pub fn restore_default_dispositions() {
    for sig in JOB_CONTROL_SIGNALS.into_iter().chain([Signal::SIGCHLD, Signal::SIGPIPE]) {
        // SAFETY: SIG_DFL installs no handler code
        let _ = unsafe { signal(sig, SigHandler::SigDfl) };
    }
    let _ = sigprocmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None);
}
