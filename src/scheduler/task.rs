/*!
 * Rotation Task
 *
 * Background timer driving round-robin jobs. Armed by each round-robin
 * launch and disarmed once no job rotates on a tick.
 */

use super::rotation::rotate;
use crate::jobs::JobStore;
use crate::signals::Signaller;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Control messages for the rotation task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationCommand {
    /// Start ticking if currently disarmed
    Arm,
    Shutdown,
}

/// Handle to the rotation background task
pub struct RotationTask {
    command_tx: mpsc::UnboundedSender<RotationCommand>,
    handle: Option<JoinHandle<()>>,
}

impl RotationTask {
    pub fn spawn(
        runtime: &Handle,
        store: Arc<Mutex<JobStore>>,
        signaller: Arc<dyn Signaller>,
        quantum: Duration,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let handle = runtime.spawn(async move {
            run_rotation_loop(store, signaller, quantum, command_rx).await;
        });

        info!(?quantum, "rotation task spawned");
        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    pub fn arm(&self) {
        let _ = self.command_tx.send(RotationCommand::Arm);
    }

    /// Ask the task to stop; it exits at its next wakeup
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(RotationCommand::Shutdown);
        self.handle.take();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

async fn run_rotation_loop(
    store: Arc<Mutex<JobStore>>,
    signaller: Arc<dyn Signaller>,
    quantum: Duration,
    mut command_rx: mpsc::UnboundedReceiver<RotationCommand>,
) {
    let mut armed = false;
    let mut interval = tokio::time::interval(quantum);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick(), if armed => {
                let busy = rotate(&mut store.lock(), signaller.as_ref());
                if !busy {
                    debug!("no round-robin job left, rotation disarmed");
                    armed = false;
                }
            }

            command = command_rx.recv() => match command {
                Some(RotationCommand::Arm) => {
                    if !armed {
                        debug!("rotation armed");
                        armed = true;
                        interval.reset();
                    }
                }
                Some(RotationCommand::Shutdown) | None => {
                    info!("rotation task shutting down");
                    break;
                }
            }
        }
    }
}

impl Drop for RotationTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(RotationCommand::Shutdown);
        }
    }
}
