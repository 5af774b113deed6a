/*!
 * Job Types
 * Processes, jobs and their lifecycle states
 */

use crate::core::limits::STATUS_LABEL_WIDTH;
use crate::parser::{LaunchPlan, Pipeline};
use nix::sys::termios::Termios;
use nix::unistd::Pid;
use std::fmt;
use std::path::PathBuf;

/// Index of one duplicated pipeline inside a round-robin job
pub type ReplicaIndex = usize;

/// Stable store identifier, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one OS process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Ready,
    Running,
    Stopped,
    Signaled,
    Completed,
}

impl ProcState {
    pub fn is_ended(self) -> bool {
        matches!(self, Self::Signaled | Self::Completed)
    }
}

/// Aggregate status of a job, derived from its processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ready,
    Running,
    Stopped,
    Completed,
    Signaled,
}

impl JobStatus {
    pub fn is_ended(self) -> bool {
        matches!(self, Self::Completed | Self::Signaled)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ready | Self::Running => "Running",
            Self::Stopped => "Stopped",
            Self::Completed => "Done",
            Self::Signaled => "Signaled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<width$}", self.label(), width = STATUS_LABEL_WIDTH)
    }
}

/// Process group state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobGroup {
    /// No stage launched yet
    Pending,
    /// Executed in-process by an inline built-in
    Internal,
    Leader(Pid),
}

impl JobGroup {
    pub fn pgid(self) -> Option<Pid> {
        match self {
            Self::Leader(pid) => Some(pid),
            Self::Pending | Self::Internal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Normal,
    RoundRobin { active: ReplicaIndex },
}

/// One pipeline stage of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub args: Vec<String>,
    pub pid: Option<Pid>,
    pub state: ProcState,
    /// Exit code or signal number
    pub info: i32,
    pub replica: ReplicaIndex,
    pub output: Option<PathBuf>,
}

impl Process {
    pub fn new(args: Vec<String>, replica: ReplicaIndex) -> Self {
        Self {
            args,
            pid: None,
            state: ProcState::Ready,
            info: 0,
            replica,
            output: None,
        }
    }

    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    /// Fresh READY copy tagged with another replica index
    pub fn replicate(&self, replica: ReplicaIndex) -> Self {
        Self {
            output: self.output.clone(),
            ..Self::new(self.args.clone(), replica)
        }
    }
}

/// One command line's execution unit
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    command: String,
    pub group: JobGroup,
    pub foreground: bool,
    /// Terminal mode to restore when the job is resumed in the foreground
    pub saved_mode: Option<Termios>,
    pub(in crate::jobs) status: JobStatus,
    pub(in crate::jobs) info: i32,
    pub notify: bool,
    pub kind: JobKind,
    pub(in crate::jobs) replicas: usize,
    pub respawnable: bool,
    /// Watchdog seconds, 0 when none
    pub timeout: u64,
    pub(crate) processes: Vec<Process>,
}

impl Job {
    pub fn new(id: JobId, command: &str, pipeline: &Pipeline) -> Self {
        let mut processes: Vec<Process> = pipeline
            .stages
            .iter()
            .map(|stage| Process::new(stage.args.clone(), 0))
            .collect();
        if let Some(last) = processes.last_mut() {
            last.output = pipeline.redirect.clone();
        }

        Self {
            id,
            command: command.trim().to_string(),
            group: JobGroup::Pending,
            foreground: pipeline.is_foreground(),
            saved_mode: None,
            status: JobStatus::Ready,
            info: 0,
            notify: false,
            kind: JobKind::Normal,
            replicas: 1,
            respawnable: pipeline.respawnable,
            timeout: pipeline.timeout,
            processes,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn info(&self) -> i32 {
        self.info
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn pgid(&self) -> Option<Pid> {
        self.group.pgid()
    }

    pub fn is_internal(&self) -> bool {
        self.group == JobGroup::Internal
    }

    /// Listed by `jobs` and addressable by `fg`/`bg`
    pub fn is_background(&self) -> bool {
        !self.foreground && !self.is_internal()
    }

    pub fn is_round_robin(&self) -> bool {
        matches!(self.kind, JobKind::RoundRobin { .. })
    }

    pub fn active_replica(&self) -> Option<ReplicaIndex> {
        match self.kind {
            JobKind::RoundRobin { active } => Some(active),
            JobKind::Normal => None,
        }
    }

    pub fn replica(&self, replica: ReplicaIndex) -> impl Iterator<Item = &Process> {
        self.processes.iter().filter(move |p| p.replica == replica)
    }

    /// Pids of the replica's members that are still alive; ended members
    /// may already be reaped and their pids reused
    pub fn replica_pids(&self, replica: ReplicaIndex) -> Vec<Pid> {
        self.replica(replica)
            .filter(|p| !p.is_ended())
            .filter_map(|p| p.pid)
            .collect()
    }

    pub fn contains_pid(&self, pid: Pid) -> bool {
        self.processes.iter().any(|p| p.pid == Some(pid))
    }

    /// Strip the plan's prefix from the first stage and shape the job for it
    pub fn apply_plan(&mut self, plan: LaunchPlan) {
        let skip = plan.prefix_len();
        if skip > 0 {
            if let Some(first) = self.processes.first_mut() {
                let skip = skip.min(first.args.len());
                first.args.drain(..skip);
            }
        }

        match plan {
            LaunchPlan::Plain => {}
            LaunchPlan::RoundRobin { replicas } => {
                self.foreground = false;
                self.kind = JobKind::RoundRobin { active: 0 };
                for _ in 1..replicas {
                    self.duplicate_pipeline();
                }
            }
            LaunchPlan::Timed { seconds } => self.timeout = seconds,
        }
    }

    /// Append a READY copy of replica 0 under the next replica index
    pub fn duplicate_pipeline(&mut self) {
        let replica = self.replicas;
        let copies: Vec<Process> = self
            .replica(0)
            .map(|process| process.replicate(replica))
            .collect();
        self.processes.extend(copies);
        self.replicas += 1;
    }
}
