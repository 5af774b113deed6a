/*!
 * Shared helpers for process-spawning tests
 */

use jobsh::{Job, JobId, Shell, ShellConfig};
use nix::sys::signal::{killpg, Signal};
use std::thread;
use std::time::{Duration, Instant};

pub fn detached_shell() -> Shell {
    let config = ShellConfig::new().with_rotation_quantum(Duration::from_millis(100));
    Shell::detached(config).expect("runtime should build")
}

/// Reconcile repeatedly until `done` holds or `timeout` elapses
pub fn wait_until(shell: &Shell, timeout: Duration, mut done: impl FnMut(&Shell) -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        shell.control().reconcile();
        if done(shell) {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

/// Id of the only job in the store
pub fn only_job(shell: &Shell) -> JobId {
    let store = shell.control().store().lock();
    assert_eq!(store.len(), 1, "expected exactly one job");
    let id = store.iter().next().map(|job| job.id).unwrap();
    id
}

pub fn with_job<T>(shell: &Shell, id: JobId, f: impl FnOnce(&Job) -> T) -> Option<T> {
    shell.control().store().lock().get(id).map(f)
}

/// SIGKILL the job's group and wait for it to be reaped
pub fn kill_job(shell: &Shell, id: JobId) {
    if let Some(Some(pgid)) = with_job(shell, id, |job| job.pgid()) {
        let _ = killpg(pgid, Signal::SIGKILL);
    }
    wait_until(shell, Duration::from_secs(5), |shell| {
        with_job(shell, id, |job| job.status().is_ended()).unwrap_or(true)
    });
}
