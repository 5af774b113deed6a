/*!
 * Terminal Arbiter
 *
 * Moves jobs between foreground and background. A foreground job owns the
 * terminal and blocks the caller until it stops or ends.
 */

use super::device::Terminal;
use crate::core::{ShellError, ShellResult};
use crate::jobs::{report, Job, JobId, JobStatus, JobStore};
use crate::process::wait_group;
use crate::signals::Signaller;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

pub struct Arbiter<'a> {
    store: &'a Mutex<JobStore>,
    terminal: Option<&'a Terminal>,
    signaller: &'a dyn Signaller,
}

impl<'a> Arbiter<'a> {
    pub fn new(
        store: &'a Mutex<JobStore>,
        terminal: Option<&'a Terminal>,
        signaller: &'a dyn Signaller,
    ) -> Self {
        Self {
            store,
            terminal,
            signaller,
        }
    }

    /// Give `id` the terminal and wait until it stops or ends.
    ///
    /// Returns the foreground report line. On failure the job stays in the
    /// store as a background job.
    #[instrument(skip(self))]
    pub fn foreground(&self, id: JobId) -> ShellResult<String> {
        let pgid = self.hand_over(id)?;
        let outcome = match self.wait_foreground(id, pgid) {
            Ok(()) => Ok(self.finish_foreground(id)),
            Err(err) => {
                warn!(job = %id, %err, "foreground wait failed");
                self.release(id);
                Err(err)
            }
        };
        self.reclaim();
        outcome
    }

    /// Continue `id` in the background if stopped. Never blocks.
    pub fn background(&self, id: JobId) -> ShellResult<String> {
        let mut store = self.store.lock();
        let job = store.get_mut(id).ok_or(ShellError::UnknownJob(id.0))?;

        if job.status() == JobStatus::Stopped {
            if let Some(pgid) = job.pgid() {
                self.signaller.signal_group(pgid, Signal::SIGCONT)?;
                job.resume();
            }
        }
        job.foreground = false;
        Ok(report::background_line(job))
    }

    /// The job is marked foreground only once it owns the terminal and runs
    fn hand_over(&self, id: JobId) -> ShellResult<Pid> {
        let mut store = self.store.lock();
        let job = store.get_mut(id).ok_or(ShellError::UnknownJob(id.0))?;
        if job.is_round_robin() {
            return Err(ShellError::RoundRobinForeground);
        }
        let pgid = job.pgid().ok_or(ShellError::UnknownJob(id.0))?;

        let handed = self.give_terminal(job, pgid).and_then(|()| {
            if job.status() == JobStatus::Stopped {
                self.signaller.signal_group(pgid, Signal::SIGCONT)?;
                job.resume();
            }
            Ok(())
        });
        if let Err(err) = handed {
            job.foreground = false;
            drop(store);
            self.reclaim();
            return Err(err);
        }

        job.saved_mode = None;
        job.foreground = true;
        Ok(pgid)
    }

    fn give_terminal(&self, job: &Job, pgid: Pid) -> ShellResult<()> {
        let Some(terminal) = self.terminal else {
            return Ok(());
        };
        if let Some(mode) = &job.saved_mode {
            if let Err(err) = terminal.restore_mode(mode) {
                warn!(%err, "could not restore the job's terminal mode");
            }
        }
        terminal.give_to(pgid)
    }

    fn wait_foreground(&self, id: JobId, pgid: Pid) -> ShellResult<()> {
        loop {
            if self.store.lock().status_of(id) != Some(JobStatus::Running) {
                return Ok(());
            }
            match wait_group(pgid)? {
                Some((pid, change)) => {
                    let mut store = self.store.lock();
                    let Some(job) = store.get_mut(id) else {
                        return Ok(());
                    };
                    job.apply(pid, change);
                    let status = job.roll_up();
                    debug!(job = %id, %pid, ?change, ?status, "foreground status change");
                }
                None => {
                    debug!(job = %id, %pgid, "foreground group has no children left");
                    return Ok(());
                }
            }
        }
    }

    /// Hand a job whose wait was interrupted back to the reaper
    fn release(&self, id: JobId) {
        if let Some(job) = self.store.lock().get_mut(id) {
            job.foreground = false;
        }
    }

    fn reclaim(&self) {
        if let Some(terminal) = self.terminal {
            if let Err(err) = terminal.reclaim() {
                warn!(%err, "could not take the terminal back");
            }
        }
    }

    fn finish_foreground(&self, id: JobId) -> String {
        let mut store = self.store.lock();
        let Some(job) = store.get_mut(id) else {
            return String::new();
        };

        if job.status() == JobStatus::Stopped {
            if let Some(terminal) = self.terminal {
                job.saved_mode = terminal.current_mode().ok();
            }
            job.foreground = false;
            report::foreground_line(job)
        } else {
            let line = report::foreground_line(job);
            store.remove(id);
            line
        }
    }
}
