/*!
 * Signal Delivery
 * Signaller implementations
 */

use super::traits::Signaller;
use crate::core::{ShellError, ShellResult};
use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tracing::trace;

/// Delivers signals through kill(2) and killpg(2)
#[derive(Debug, Default, Clone, Copy)]
pub struct NixSignaller;

impl Signaller for NixSignaller {
    fn signal_process(&self, pid: Pid, signal: Signal) -> ShellResult<()> {
        trace!(%pid, ?signal, "kill");
        kill(pid, signal).map_err(ShellError::Signal)
    }

    fn signal_group(&self, pgid: Pid, signal: Signal) -> ShellResult<()> {
        trace!(%pgid, ?signal, "killpg");
        killpg(pgid, signal).map_err(ShellError::Signal)
    }

    fn group_alive(&self, pgid: Pid) -> bool {
        killpg(pgid, None).is_ok()
    }
}

/// Where a recorded signal was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Process(Pid),
    Group(Pid),
}

/// Records deliveries instead of sending them
#[derive(Debug)]
pub struct RecordingSignaller {
    sent: Mutex<Vec<(Target, Signal)>>,
    alive: bool,
    refuse: bool,
}

impl Default for RecordingSignaller {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSignaller {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            alive: true,
            refuse: false,
        }
    }

    /// Groups are reported as already gone
    pub fn with_dead_groups() -> Self {
        Self {
            alive: false,
            ..Self::new()
        }
    }

    /// Every delivery is recorded and then fails with EPERM
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<(Target, Signal)> {
        self.sent.lock().clone()
    }

    /// Processes that received `signal`, in delivery order
    pub fn processes_sent(&self, signal: Signal) -> Vec<Pid> {
        self.sent
            .lock()
            .iter()
            .filter_map(|(target, sig)| match target {
                Target::Process(pid) if *sig == signal => Some(*pid),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    fn record(&self, target: Target, signal: Signal) -> ShellResult<()> {
        self.sent.lock().push((target, signal));
        if self.refuse {
            return Err(ShellError::Signal(Errno::EPERM));
        }
        Ok(())
    }
}

impl Signaller for RecordingSignaller {
    fn signal_process(&self, pid: Pid, signal: Signal) -> ShellResult<()> {
        self.record(Target::Process(pid), signal)
    }

    fn signal_group(&self, pgid: Pid, signal: Signal) -> ShellResult<()> {
        self.record(Target::Group(pgid), signal)
    }

    fn group_alive(&self, _pgid: Pid) -> bool {
        self.alive
    }
}
