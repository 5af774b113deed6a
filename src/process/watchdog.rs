/*!
 * Timeout Watchdog
 * Terminates a job's process group once its time limit elapses
 */

use crate::signals::Signaller;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Spawn a one-shot watchdog for `pgid`.
///
/// Resolves to true when SIGTERM was delivered.
pub fn spawn_watchdog(
    runtime: &Handle,
    pgid: Pid,
    limit: Duration,
    signaller: Arc<dyn Signaller>,
) -> JoinHandle<bool> {
    debug!(%pgid, ?limit, "watchdog armed");
    runtime.spawn(async move {
        tokio::time::sleep(limit).await;

        if !signaller.group_alive(pgid) {
            debug!(%pgid, "watchdog expired after the group ended");
            return false;
        }

        match signaller.signal_group(pgid, Signal::SIGTERM) {
            Ok(()) => {
                info!(%pgid, "time limit reached, group terminated");
                true
            }
            Err(err) => {
                warn!(%pgid, %err, "watchdog could not terminate group");
                false
            }
        }
    })
}
