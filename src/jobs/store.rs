/*!
 * Job Store
 * Insertion-ordered registry of live jobs
 */

use super::reconcile::{Settlement, StatusChange};
use super::report;
use super::types::{Job, JobId, JobStatus, ReplicaIndex};
use crate::parser::Pipeline;
use crate::signals::Signaller;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tracing::{debug, info};

/// Jobs in creation order
///
/// Background numbers (as used by `jobs`, `fg` and `bg`) are 1-based
/// positions among background jobs that are not internal.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Vec<Job>,
    next_id: u64,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job built from a parsed command line
    pub fn create(&mut self, command: &str, pipeline: &Pipeline) -> JobId {
        self.next_id += 1;
        let id = JobId(self.next_id);
        self.jobs.push(Job::new(id, command, pipeline));
        debug!(job = %id, command, "job created");
        id
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        self.jobs.iter_mut()
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.id == id)
    }

    pub fn find_by_group(&self, pgid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|job| job.pgid() == Some(pgid))
    }

    pub fn find_by_pid(&self, pid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|job| job.contains_pid(pid))
    }

    /// The successor of a job in creation order
    pub fn next_after(&self, id: JobId) -> Option<&Job> {
        let position = self.jobs.iter().position(|job| job.id == id)?;
        self.jobs.get(position + 1)
    }

    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        let position = self.jobs.iter().position(|job| job.id == id)?;
        Some(self.jobs.remove(position))
    }

    pub fn remove_group(&mut self, pgid: Pid) -> Option<Job> {
        let position = self.jobs.iter().position(|job| job.pgid() == Some(pgid))?;
        Some(self.jobs.remove(position))
    }

    pub fn remove_replica(&mut self, id: JobId, replica: ReplicaIndex) -> bool {
        self.get_mut(id)
            .is_some_and(|job| job.remove_replica(replica))
    }

    /// Background jobs with their 1-based numbers
    pub fn background(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.jobs
            .iter()
            .filter(|job| job.is_background())
            .enumerate()
            .map(|(i, job)| (i + 1, job))
    }

    /// The nth background job (1-based)
    pub fn nth_background(&self, n: usize) -> Option<JobId> {
        self.background()
            .find(|(index, _)| *index == n)
            .map(|(_, job)| job.id)
    }

    /// Route a status change to the job owning `pid`
    pub fn apply(&mut self, pid: Pid, change: StatusChange) -> Option<JobId> {
        let job = self.jobs.iter_mut().find(|job| job.contains_pid(pid))?;
        job.apply(pid, change);
        Some(job.id)
    }

    /// Status lines for `jobs`
    pub fn listing(&self) -> Vec<String> {
        self.background()
            .map(|(index, job)| report::status_line(index, job))
            .collect()
    }

    /// Report finished and notifying background jobs; finished ones are removed
    pub fn drain_notifications(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut finished = Vec::new();
        let mut index = 0;

        for job in self.jobs.iter_mut().filter(|job| job.is_background()) {
            index += 1;
            if job.status().is_ended() {
                lines.push(report::status_line(index, job));
                finished.push(job.id);
            } else if job.notify {
                lines.push(report::status_line(index, job));
                job.notify = false;
            }
        }

        self.jobs.retain(|job| !finished.contains(&job.id));
        lines
    }

    /// One reconciliation pass over every job not owned by the foreground wait.
    ///
    /// `poll` returns the next pending change for a pid without blocking.
    /// Returns the command lines of respawnable jobs that completed; those
    /// jobs are already removed.
    pub fn sweep<F>(&mut self, mut poll: F, signaller: &dyn Signaller) -> Vec<String>
    where
        F: FnMut(Pid) -> Option<StatusChange>,
    {
        let mut respawns = Vec::new();
        let mut discarded = Vec::new();

        for job in self.jobs.iter_mut().filter(|job| !job.foreground) {
            if job.pgid().is_none() || job.status().is_ended() {
                continue;
            }
            let previous = job.status();

            for process in job.processes.iter_mut().filter(|p| !p.is_ended()) {
                let Some(pid) = process.pid else { continue };
                while let Some(change) = poll(pid) {
                    process.advance(change);
                    if process.is_ended() {
                        break;
                    }
                }
            }

            if let Some(active) = job.prune_replicas() {
                for pid in job.replica_pids(active) {
                    if let Err(err) = signaller.signal_process(pid, Signal::SIGCONT) {
                        debug!(%pid, %err, "continuing replacement replica failed");
                    }
                }
            }

            match job.settle(previous) {
                Settlement::Respawn => {
                    info!(job = %job.id, command = job.command(), "respawning completed job");
                    respawns.push(job.command().to_string());
                    discarded.push(job.id);
                }
                Settlement::Notify => {
                    debug!(job = %job.id, status = ?job.status(), "job flagged for notification");
                }
                Settlement::Quiet => {}
            }
        }

        self.jobs.retain(|job| !discarded.contains(&job.id));
        respawns
    }

    /// Status of a job, if still tracked
    pub fn status_of(&self, id: JobId) -> Option<JobStatus> {
        self.get(id).map(Job::status)
    }
}
