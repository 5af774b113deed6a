/*!
 * State Machine Tests
 * Process transitions and job roll-up
 */

use jobsh::jobs::{Job, JobId, Process, Settlement};
use jobsh::{JobStatus, LaunchPlan, Pipeline, ProcState, StatusChange};
use nix::unistd::Pid;
use pretty_assertions::assert_eq;

fn started(line: &str) -> Job {
    started_with(line, LaunchPlan::Plain)
}

fn started_with(line: &str, plan: LaunchPlan) -> Job {
    let mut job = Job::new(JobId(1), line, &Pipeline::parse(line));
    job.apply_plan(plan);
    for i in 0..job.processes().len() {
        job.record_start(i, Pid::from_raw(10 + i as i32));
    }
    job.roll_up();
    job
}

#[test]
fn test_first_notification_starts_ready_process() {
    for change in [
        StatusChange::Started,
        StatusChange::Continued,
        StatusChange::Stopped(19),
        StatusChange::Exited(0),
        StatusChange::Signaled(9),
    ] {
        let mut process = Process::new(vec!["x".into()], 0);
        process.advance(change);
        assert_eq!(process.state, ProcState::Running, "{change:?}");
    }
}

#[test]
fn test_rollup_signaled_when_any_member_signaled() {
    let mut job = started("a | b");
    job.apply(Pid::from_raw(10), StatusChange::Exited(0));
    job.apply(Pid::from_raw(11), StatusChange::Signaled(9));
    assert_eq!(job.roll_up(), JobStatus::Signaled);
    assert_eq!(job.info(), 9);
}

#[test]
fn test_rollup_completed_reports_last_stage() {
    let mut job = started("a | b");
    job.apply(Pid::from_raw(10), StatusChange::Exited(4));
    job.apply(Pid::from_raw(11), StatusChange::Exited(7));
    assert_eq!(job.roll_up(), JobStatus::Completed);
    assert_eq!(job.info(), 7);
}

#[test]
fn test_rollup_is_idempotent() {
    let mut job = started("a | b | c");
    job.apply(Pid::from_raw(10), StatusChange::Stopped(20));
    job.apply(Pid::from_raw(11), StatusChange::Exited(0));

    let first = job.roll_up();
    let info = job.info();
    let second = job.roll_up();
    assert_eq!(first, second);
    assert_eq!(job.info(), info);
}

#[test]
fn test_unknown_pid_is_ignored() {
    let mut job = started("a");
    assert!(!job.apply(Pid::from_raw(99), StatusChange::Exited(0)));
    assert_eq!(job.roll_up(), JobStatus::Running);
}

#[test]
fn test_background_completion_notifies() {
    let mut job = started("make &");
    job.apply(Pid::from_raw(10), StatusChange::Exited(2));
    assert_eq!(job.settle(JobStatus::Running), Settlement::Notify);
    assert!(job.notify);
}

#[test]
fn test_round_robin_stop_does_not_notify() {
    let mut job = started_with("rr 2 yes &", LaunchPlan::RoundRobin { replicas: 2 });
    job.apply(Pid::from_raw(11), StatusChange::Stopped(19));
    job.apply(Pid::from_raw(10), StatusChange::Stopped(19));
    assert_eq!(job.settle(JobStatus::Running), Settlement::Quiet);
    assert!(!job.notify);
}

#[test]
fn test_round_robin_plan_duplicates_pipeline() {
    let line = "rr 3 yes | head -n 1 > out.txt";
    let mut job = Job::new(JobId(7), line, &Pipeline::parse(line));
    job.apply_plan(LaunchPlan::RoundRobin { replicas: 3 });

    assert!(!job.foreground);
    assert_eq!(job.replicas(), 3);
    assert_eq!(job.processes().len(), 6);
    for replica in 0..3 {
        let stages: Vec<&Process> = job.replica(replica).collect();
        assert_eq!(stages[0].args, vec!["yes".to_string()]);
        assert_eq!(stages[1].output.as_deref(), Some(std::path::Path::new("out.txt")));
        assert!(stages.iter().all(|p| p.state == ProcState::Ready && p.pid.is_none()));
    }
}

#[test]
fn test_timed_plan_sets_timeout() {
    let line = "timeout 5 sleep 60";
    let mut job = Job::new(JobId(8), line, &Pipeline::parse(line));
    job.apply_plan(LaunchPlan::Timed { seconds: 5 });
    assert_eq!(job.timeout, 5);
    assert_eq!(job.processes()[0].args, vec!["sleep".to_string(), "60".to_string()]);
    assert!(job.foreground);
}
