/*!
 * Signal Traits
 * Signal delivery abstraction used by the scheduler, reconciler and watchdog
 */

use crate::core::ShellResult;
use nix::sys::signal::Signal;
use nix::unistd::Pid;

/// Signal delivery interface
pub trait Signaller: Send + Sync {
    /// Send a signal to a single process
    fn signal_process(&self, pid: Pid, signal: Signal) -> ShellResult<()>;

    /// Send a signal to every member of a process group
    fn signal_group(&self, pgid: Pid, signal: Signal) -> ShellResult<()>;

    /// Whether the group still has members (signal 0, nothing is reaped)
    fn group_alive(&self, pgid: Pid) -> bool;
}
