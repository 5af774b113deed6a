/*!
 * Child Status Waits
 */

use crate::core::{ShellError, ShellResult};
use crate::jobs::StatusChange;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;
use tracing::trace;

/// Next pending change for `pid` without blocking; stops and continues included
pub fn poll_status(pid: Pid) -> Option<StatusChange> {
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
    loop {
        match waitpid(pid, Some(flags)) {
            Ok(status) => return StatusChange::from_wait(status).map(|(_, change)| change),
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                trace!(%pid, %errno, "waitpid found nothing to report");
                return None;
            }
        }
    }
}

/// Block until some member of `pgid` stops or ends.
///
/// Returns `None` once the group has no children left to wait for.
pub fn wait_group(pgid: Pid) -> ShellResult<Option<(Pid, StatusChange)>> {
    let group = Pid::from_raw(-pgid.as_raw());
    loop {
        match waitpid(group, Some(WaitPidFlag::WUNTRACED)) {
            Ok(status) => {
                if let Some(event) = StatusChange::from_wait(status) {
                    return Ok(Some(event));
                }
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => return Ok(None),
            Err(errno) => return Err(ShellError::Io(errno.into())),
        }
    }
}
