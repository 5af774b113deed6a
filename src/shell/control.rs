/*!
 * Job Control
 *
 * Owns the job store and everything that acts on it: the launcher, the
 * terminal arbiter, the child-status reaper, the rotation timer and the
 * timeout watchdogs.
 */

use crate::builtins::{BuiltinTable, History, Snapshot};
use crate::core::{ShellConfig, ShellError, ShellResult};
use crate::jobs::{JobGroup, JobId, JobStatus, JobStore};
use crate::parser::{LaunchPlan, Pipeline};
use crate::process::{poll_status, spawn_job, spawn_watchdog, LaunchContext};
use crate::scheduler::{signal_replica, RotationTask};
use crate::signals::{NixSignaller, Signaller};
use crate::terminal::{Arbiter, Terminal};
use nix::sys::signal::Signal;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

pub struct JobControl {
    store: Arc<Mutex<JobStore>>,
    terminal: Option<Terminal>,
    signaller: Arc<dyn Signaller>,
    builtins: Arc<BuiltinTable>,
    history: Mutex<History>,
    rotation: Mutex<RotationTask>,
    reaper: Mutex<Option<JoinHandle<()>>>,
    runtime: Handle,
    config: ShellConfig,
}

impl JobControl {
    /// Without a terminal every hand-over is a no-op
    pub fn new(
        config: ShellConfig,
        terminal: Option<Terminal>,
        builtins: Arc<BuiltinTable>,
        runtime: Handle,
    ) -> Arc<Self> {
        Self::with_signaller(config, terminal, builtins, runtime, Arc::new(NixSignaller))
    }

    pub fn with_signaller(
        config: ShellConfig,
        terminal: Option<Terminal>,
        builtins: Arc<BuiltinTable>,
        runtime: Handle,
        signaller: Arc<dyn Signaller>,
    ) -> Arc<Self> {
        let store = Arc::new(Mutex::new(JobStore::new()));
        let rotation = RotationTask::spawn(
            &runtime,
            Arc::clone(&store),
            Arc::clone(&signaller),
            config.rotation_quantum,
        );

        Arc::new(Self {
            store,
            terminal,
            signaller,
            builtins,
            history: Mutex::new(History::new()),
            rotation: Mutex::new(rotation),
            reaper: Mutex::new(None),
            runtime,
            config,
        })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn builtins(&self) -> &Arc<BuiltinTable> {
        &self.builtins
    }

    pub fn store(&self) -> &Arc<Mutex<JobStore>> {
        &self.store
    }

    pub fn has_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Reconcile on every SIGCHLD until shutdown
    pub fn start_reaper(self: &Arc<Self>) {
        let control = Arc::clone(self);
        let handle = self.runtime.spawn(async move {
            let mut sigchld = match signal(SignalKind::child()) {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "SIGCHLD stream unavailable, relying on prompt-time sweeps");
                    return;
                }
            };
            while sigchld.recv().await.is_some() {
                control.reconcile();
            }
        });
        *self.reaper.lock() = Some(handle);
        info!("child reaper started");
    }

    pub fn record_history(&self, line: &str) {
        self.history.lock().record(line);
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().entries().to_vec()
    }

    pub fn create_job(&self, command: &str, pipeline: &Pipeline) -> JobId {
        self.store.lock().create(command, pipeline)
    }

    pub fn mark_internal(&self, id: JobId) {
        if let Some(job) = self.store.lock().get_mut(id) {
            job.group = JobGroup::Internal;
        }
    }

    /// Drop an inline built-in's job unless the built-in launched it
    pub fn discard_internal(&self, id: JobId) {
        let mut store = self.store.lock();
        if store.get(id).is_some_and(|job| job.is_internal()) {
            store.remove(id);
        }
    }

    /// Fork the job's processes and set up plan-specific supervision
    #[instrument(skip(self))]
    pub fn launch(&self, id: JobId, plan: LaunchPlan) -> ShellResult<()> {
        let mut store = self.store.lock();

        let needs_snapshot = {
            let job = store.get_mut(id).ok_or(ShellError::UnknownJob(id.0))?;
            job.apply_plan(plan);
            if job.is_internal() {
                job.group = JobGroup::Pending;
            }
            job.processes()
                .iter()
                .any(|p| self.builtins.forked_handler(p.program()).is_some())
        };
        let snapshot = if needs_snapshot {
            self.snapshot(&store)
        } else {
            Snapshot::default()
        };

        let ctx = LaunchContext {
            terminal: self.terminal.as_ref(),
            builtins: &self.builtins,
            snapshot: &snapshot,
        };
        let job = store.get_mut(id).ok_or(ShellError::UnknownJob(id.0))?;
        let outcome = spawn_job(job, &ctx);

        let Some(pgid) = job.pgid().filter(|_| outcome.is_ok()) else {
            store.remove(id);
            return Err(outcome.err().unwrap_or(ShellError::UnknownJob(id.0)));
        };

        if job.is_round_robin() {
            if let Err(err) = self.signaller.signal_group(pgid, Signal::SIGSTOP) {
                warn!(%pgid, %err, "could not pause round-robin group");
            }
            signal_replica(job, 0, Signal::SIGCONT, self.signaller.as_ref());
            self.rotation.lock().arm();
        }
        job.roll_up();

        if job.timeout > 0 {
            spawn_watchdog(
                &self.runtime,
                pgid,
                Duration::from_secs(job.timeout),
                Arc::clone(&self.signaller),
            );
        }

        info!(
            job = %id,
            %pgid,
            command = job.command(),
            replicas = job.replicas(),
            foreground = job.foreground,
            "job launched"
        );
        Ok(())
    }

    /// Launch, then either wait in the foreground or report the background job
    pub fn start(&self, id: JobId, plan: LaunchPlan) -> ShellResult<String> {
        self.launch(id, plan)?;
        let foreground = self.store.lock().get(id).is_some_and(|job| job.foreground);
        if foreground {
            self.bring_to_foreground(id)
        } else {
            self.send_to_background(id)
        }
    }

    /// Fresh job from a command line, launched in the background
    pub fn relaunch(&self, command: &str) -> ShellResult<JobId> {
        let pipeline = Pipeline::parse_with(command, self.config.parse_limits());
        let plan = LaunchPlan::parse(pipeline.first_args())?;
        let id = self.create_job(command, &pipeline);
        self.launch(id, plan)?;
        Ok(id)
    }

    /// Sweep the store, then relaunch respawnable jobs that completed
    pub fn reconcile(&self) {
        let respawns = {
            let mut store = self.store.lock();
            store.sweep(poll_status, self.signaller.as_ref())
        };

        for command in respawns {
            if let Err(err) = self.relaunch(&command) {
                warn!(command, %err, "respawn failed");
            }
        }
    }

    pub fn drain_notifications(&self) -> Vec<String> {
        self.store.lock().drain_notifications()
    }

    /// The nth background job (1-based)
    pub fn nth_background(&self, n: usize) -> ShellResult<JobId> {
        let store = self.store.lock();
        if store.background().next().is_none() {
            return Err(ShellError::NoPendingJobs);
        }
        store.nth_background(n).ok_or(ShellError::NoSuchJob(n))
    }

    pub fn status_of(&self, id: JobId) -> Option<JobStatus> {
        self.store.lock().status_of(id)
    }

    pub fn bring_to_foreground(&self, id: JobId) -> ShellResult<String> {
        self.arbiter().foreground(id)
    }

    pub fn send_to_background(&self, id: JobId) -> ShellResult<String> {
        self.arbiter().background(id)
    }

    pub fn snapshot(&self, store: &JobStore) -> Snapshot {
        Snapshot {
            jobs: store.listing(),
            history: self.history(),
        }
    }

    /// Stop the reaper and the rotation timer
    pub fn shutdown(&self) {
        if let Some(reaper) = self.reaper.lock().take() {
            reaper.abort();
        }
        self.rotation.lock().shutdown();
        debug!("job control shut down");
    }

    fn arbiter(&self) -> Arbiter<'_> {
        Arbiter::new(&self.store, self.terminal.as_ref(), self.signaller.as_ref())
    }
}
