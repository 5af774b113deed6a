/*!
 * Job Store Tests
 * Ordering, lookups, removal, sweeps and notification draining
 */

use jobsh::jobs::{JobId, JobStore, StatusChange};
use jobsh::{JobStatus, Pipeline, RecordingSignaller};
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn add(store: &mut JobStore, line: &str) -> JobId {
    store.create(line, &Pipeline::parse(line))
}

/// Mark every stage started with fake pids `base`, `base + 1`, ...
fn start(store: &mut JobStore, id: JobId, base: i32) {
    let job = store.get_mut(id).unwrap();
    for i in 0..job.processes().len() {
        job.record_start(i, Pid::from_raw(base + i as i32));
    }
    job.roll_up();
}

/// A poll source replaying queued changes per pid
fn replay(events: &mut HashMap<i32, Vec<StatusChange>>) -> impl FnMut(Pid) -> Option<StatusChange> + '_ {
    move |pid| {
        let queue = events.get_mut(&pid.as_raw())?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }
}

fn commands(store: &JobStore) -> Vec<&str> {
    store.iter().map(|job| job.command()).collect()
}

#[test]
fn test_insertion_order_and_group_removal() {
    let mut store = JobStore::new();
    let a = add(&mut store, "a");
    let b = add(&mut store, "b");
    start(&mut store, a, 100);
    start(&mut store, b, 200);

    assert_eq!(commands(&store), vec!["a", "b"]);
    assert_eq!(store.next_after(a).map(|job| job.id), Some(b));

    let removed = store.remove_group(Pid::from_raw(100)).unwrap();
    assert_eq!(removed.id, a);
    assert_eq!(commands(&store), vec!["b"]);
    assert_eq!(store.iter().next().map(|job| job.id), Some(b));
    assert!(store.next_after(b).is_none());
}

#[test]
fn test_first_stage_leads_the_group() {
    let mut store = JobStore::new();
    let id = add(&mut store, "cat | sort | uniq");
    start(&mut store, id, 300);

    let job = store.get(id).unwrap();
    assert_eq!(job.pgid(), Some(Pid::from_raw(300)));
    assert_eq!(store.find_by_pid(Pid::from_raw(302)).map(|j| j.id), Some(id));
    assert_eq!(job.status(), JobStatus::Running);
}

#[test]
fn test_sweep_flags_finished_background_job() {
    let mut store = JobStore::new();
    let id = add(&mut store, "sleep 1 &");
    start(&mut store, id, 400);

    let mut events = HashMap::from([(400, vec![StatusChange::Exited(0)])]);
    let respawns = store.sweep(replay(&mut events), &RecordingSignaller::new());

    assert!(respawns.is_empty());
    let job = store.get(id).unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert!(job.notify);

    assert_eq!(store.drain_notifications(), vec!["[1]\tDone           \tsleep 1 &".to_string()]);
    assert!(store.is_empty());
}

#[test]
fn test_sweep_skips_foreground_jobs() {
    let mut store = JobStore::new();
    let id = add(&mut store, "vim notes");
    start(&mut store, id, 500);

    let mut events = HashMap::from([(500, vec![StatusChange::Stopped(20)])]);
    store.sweep(replay(&mut events), &RecordingSignaller::new());

    assert_eq!(store.status_of(id), Some(JobStatus::Running));
    assert_eq!(events[&500].len(), 1);
}

#[test]
fn test_stopped_job_notifies_once() {
    let mut store = JobStore::new();
    let id = add(&mut store, "cat &");
    start(&mut store, id, 600);

    let mut events = HashMap::from([(600, vec![StatusChange::Stopped(21)])]);
    store.sweep(replay(&mut events), &RecordingSignaller::new());

    assert_eq!(store.drain_notifications(), vec!["[1]\tStopped        \tcat &".to_string()]);
    assert!(store.drain_notifications().is_empty());
    assert_eq!(store.len(), 1);
    assert_eq!(store.listing(), vec!["[1]\tStopped        \tcat &".to_string()]);
}

#[test]
fn test_sweep_requests_respawn() {
    let mut store = JobStore::new();
    let id = add(&mut store, "date +");
    start(&mut store, id, 700);

    let mut events = HashMap::from([(700, vec![StatusChange::Exited(0)])]);
    let respawns = store.sweep(replay(&mut events), &RecordingSignaller::new());

    assert_eq!(respawns, vec!["date +".to_string()]);
    assert!(store.get(id).is_none());
    assert!(store.drain_notifications().is_empty());
}

#[test]
fn test_sweep_prunes_and_continues_replacement_replica() {
    let mut store = JobStore::new();
    let line = "rr 3 yes &";
    let id = add(&mut store, line);
    store
        .get_mut(id)
        .unwrap()
        .apply_plan(jobsh::LaunchPlan::RoundRobin { replicas: 3 });
    start(&mut store, id, 800);

    // Replica 0 is active and finishes
    let mut events = HashMap::from([(800, vec![StatusChange::Exited(0)])]);
    let recorder = RecordingSignaller::new();
    store.sweep(replay(&mut events), &recorder);

    let job = store.get(id).unwrap();
    assert_eq!(job.replicas(), 2);
    assert_eq!(job.active_replica(), Some(0));
    assert_eq!(job.replica_pids(0), vec![Pid::from_raw(801)]);
    assert_eq!(recorder.processes_sent(Signal::SIGCONT), vec![Pid::from_raw(801)]);
    assert!(!job.notify);
    assert_eq!(store.listing(), vec!["[1]\tRunning        \trr 3 yes & {*2}".to_string()]);
}
