/*!
 * Round-Robin Rotation
 *
 * One quantum elapsed: every round-robin job with several replicas stops
 * its active replica (SIGSTOP) and continues the next one (SIGCONT).
 */

use crate::jobs::{Job, JobKind, JobStore, ReplicaIndex};
use crate::signals::Signaller;
use nix::sys::signal::Signal;
use tracing::{debug, trace};

/// Advance every round-robin job by one slot.
///
/// Returns whether any job rotated; the timer stays armed only then.
pub fn rotate(store: &mut JobStore, signaller: &dyn Signaller) -> bool {
    let mut rotated = 0;

    for job in store.iter_mut() {
        let JobKind::RoundRobin { active } = job.kind else {
            continue;
        };
        let Some(pgid) = job.pgid() else { continue };
        if job.status().is_ended() {
            continue;
        }

        if job.replicas() > 1 {
            let next = (active + 1) % job.replicas();
            signal_replica(job, active, Signal::SIGSTOP, signaller);
            signal_replica(job, next, Signal::SIGCONT, signaller);
            job.kind = JobKind::RoundRobin { active: next };
            trace!(job = %job.id, from = active, to = next, "replica rotated");
            rotated += 1;
        } else if let Err(err) = signaller.signal_group(pgid, Signal::SIGCONT) {
            debug!(%pgid, %err, "continuing single replica failed");
        }
    }

    rotated > 0
}

/// Deliver `signal` to every live process of one replica
pub fn signal_replica(
    job: &Job,
    replica: ReplicaIndex,
    signal: Signal,
    signaller: &dyn Signaller,
) {
    for pid in job.replica_pids(replica) {
        if let Err(err) = signaller.signal_process(pid, signal) {
            debug!(%pid, ?signal, %err, "replica signal not delivered");
        }
    }
}
