/*!
 * State Reconciler
 *
 * Applies observed status changes to processes and derives the job status
 * from them. Every transition is driven by a change reported for one pid;
 * anything the state machine does not expect is ignored.
 */

use super::types::{Job, JobGroup, JobKind, JobStatus, ProcState, Process, ReplicaIndex};
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use tracing::debug;

/// A status change observed for one child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// Recorded by the launcher right after the fork
    Started,
    Continued,
    Stopped(i32),
    Exited(i32),
    Signaled(i32),
}

impl StatusChange {
    /// Translate a wait status; `StillAlive` and ptrace events carry no change
    pub fn from_wait(status: WaitStatus) -> Option<(Pid, Self)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, Self::Exited(code))),
            WaitStatus::Signaled(pid, signal, _) => Some((pid, Self::Signaled(signal as i32))),
            WaitStatus::Stopped(pid, signal) => Some((pid, Self::Stopped(signal as i32))),
            WaitStatus::Continued(pid) => Some((pid, Self::Continued)),
            _ => None,
        }
    }
}

/// What the reaper should do with a job after a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Quiet,
    Notify,
    Respawn,
}

impl Process {
    /// Advance the state machine; returns whether the state changed
    pub fn advance(&mut self, change: StatusChange) -> bool {
        let next = match (self.state, change) {
            (ProcState::Ready, _) => Some((ProcState::Running, None)),
            (ProcState::Stopped, StatusChange::Continued) => Some((ProcState::Running, None)),
            (ProcState::Running, StatusChange::Stopped(signal)) => {
                Some((ProcState::Stopped, Some(signal)))
            }
            (ProcState::Running | ProcState::Stopped, StatusChange::Exited(code)) => {
                Some((ProcState::Completed, Some(code)))
            }
            (ProcState::Running | ProcState::Stopped, StatusChange::Signaled(signal)) => {
                Some((ProcState::Signaled, Some(signal)))
            }
            _ => None,
        };

        match next {
            Some((state, info)) => {
                debug!(pid = ?self.pid, from = ?self.state, to = ?state, "process transition");
                self.state = state;
                if let Some(info) = info {
                    self.info = info;
                }
                true
            }
            None => false,
        }
    }
}

/// Aggregate a set of processes into a status and the info it reports
fn summarize<'a>(processes: impl Iterator<Item = &'a Process>) -> (JobStatus, Option<i32>) {
    let mut all_ended = true;
    let mut any_running = false;
    let mut any_stopped = false;
    let mut signaled: Option<i32> = None;
    let mut last_info: Option<i32> = None;

    for process in processes {
        match process.state {
            ProcState::Running => any_running = true,
            ProcState::Stopped => any_stopped = true,
            ProcState::Signaled => {
                signaled.get_or_insert(process.info);
            }
            ProcState::Completed | ProcState::Ready => {}
        }
        all_ended &= process.is_ended();
        last_info = Some(process.info);
    }

    if all_ended {
        match signaled {
            Some(info) => (JobStatus::Signaled, Some(info)),
            None => (JobStatus::Completed, last_info),
        }
    } else if any_stopped && !any_running {
        (JobStatus::Stopped, None)
    } else {
        (JobStatus::Running, None)
    }
}

impl Job {
    /// Record that stage `index` was forked as `pid`.
    ///
    /// The first started stage becomes the group leader. Returns the group id.
    pub fn record_start(&mut self, index: usize, pid: Pid) -> Option<Pid> {
        let process = self.processes.get_mut(index)?;
        process.pid = Some(pid);
        process.advance(StatusChange::Started);

        match self.group {
            JobGroup::Leader(pgid) => Some(pgid),
            JobGroup::Pending | JobGroup::Internal => {
                self.group = JobGroup::Leader(pid);
                Some(pid)
            }
        }
    }

    /// Apply a change to the process with `pid`; unknown pids are ignored
    pub fn apply(&mut self, pid: Pid, change: StatusChange) -> bool {
        self.processes
            .iter_mut()
            .find(|p| p.pid == Some(pid))
            .is_some_and(|p| p.advance(change))
    }

    /// Recompute the aggregate status from the processes
    pub fn roll_up(&mut self) -> JobStatus {
        let (status, info) = summarize(self.processes.iter());
        self.status = status;
        if let Some(info) = info {
            self.info = info;
        }
        status
    }

    pub fn replica_status(&self, replica: ReplicaIndex) -> JobStatus {
        summarize(self.replica(replica)).0
    }

    /// Mark stopped processes running after a SIGCONT was delivered
    pub fn resume(&mut self) -> JobStatus {
        for process in self
            .processes
            .iter_mut()
            .filter(|p| p.state == ProcState::Stopped)
        {
            process.advance(StatusChange::Continued);
        }
        self.roll_up()
    }

    /// Remove one replica and renumber the rest densely.
    /// Returns true when the active replica was the one removed.
    pub fn remove_replica(&mut self, replica: ReplicaIndex) -> bool {
        if replica >= self.replicas {
            return false;
        }

        self.processes.retain(|p| p.replica != replica);
        for process in self.processes.iter_mut().filter(|p| p.replica > replica) {
            process.replica -= 1;
        }
        self.replicas -= 1;

        match self.kind {
            JobKind::RoundRobin { active } if active == replica => {
                self.kind = JobKind::RoundRobin {
                    active: replica % self.replicas.max(1),
                };
                true
            }
            JobKind::RoundRobin { active } if active > replica => {
                self.kind = JobKind::RoundRobin { active: active - 1 };
                false
            }
            _ => false,
        }
    }

    /// Drop fully ended replicas while more than one remains.
    /// Returns the new active replica when the old one was removed.
    pub fn prune_replicas(&mut self) -> Option<ReplicaIndex> {
        let mut replaced = false;
        let mut replica = 0;

        while self.replicas > 1 && replica < self.replicas {
            if self.replica_status(replica).is_ended() {
                debug!(job = %self.id, replica, "pruning finished replica");
                replaced |= self.remove_replica(replica);
            } else {
                replica += 1;
            }
        }

        if replaced {
            self.active_replica()
        } else {
            None
        }
    }

    /// Roll up and decide how a background job's change is surfaced
    pub fn settle(&mut self, previous: JobStatus) -> Settlement {
        let status = self.roll_up();
        if self.foreground || status == previous {
            return Settlement::Quiet;
        }

        match status {
            JobStatus::Completed if self.respawnable => Settlement::Respawn,
            JobStatus::Stopped if self.is_round_robin() || self.respawnable => Settlement::Quiet,
            JobStatus::Stopped | JobStatus::Completed | JobStatus::Signaled if !self.respawnable => {
                self.notify = true;
                Settlement::Notify
            }
            _ => Settlement::Quiet,
        }
    }
}
