/*!
 * Launch Tests
 * Foreground waits, background reconciliation, pipes and redirection
 */

use super::support::{detached_shell, kill_job, only_job, wait_until, with_job};
use jobsh::JobStatus;
use nix::sys::signal::{killpg, Signal};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
#[serial]
fn test_foreground_job_is_removed_when_done() {
    let mut shell = detached_shell();
    shell.execute("true");
    assert!(shell.control().store().lock().is_empty());
    assert_eq!(shell.control().history(), vec!["true".to_string()]);
}

#[test]
#[serial]
fn test_redirect_creates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");
    let mut shell = detached_shell();

    shell.execute(&format!("echo hello world > {}", path.display()));

    assert_eq!(fs::read_to_string(&path).unwrap(), "hello world\n");
}

#[test]
#[serial]
fn test_pipeline_connects_stages() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("count.txt");
    let mut shell = detached_shell();

    shell.execute(&format!("echo one two three | wc -w > {}", path.display()));

    assert_eq!(fs::read_to_string(&path).unwrap().trim(), "3");
}

#[test]
#[serial]
fn test_background_job_reported_done() {
    let mut shell = detached_shell();
    shell.execute("true &");
    let id = only_job(&shell);

    let finished = wait_until(&shell, Duration::from_secs(5), |shell| {
        shell.control().status_of(id) == Some(JobStatus::Completed)
    });
    assert!(finished);

    assert_eq!(
        shell.control().drain_notifications(),
        vec!["[1]\tDone           \ttrue &".to_string()]
    );
    assert!(shell.control().store().lock().is_empty());
}

#[test]
#[serial]
fn test_missing_program_exits_with_errno() {
    let mut shell = detached_shell();
    shell.execute("jobsh-no-such-program-here &");
    let id = only_job(&shell);

    assert!(wait_until(&shell, Duration::from_secs(5), |shell| {
        shell.control().status_of(id) == Some(JobStatus::Completed)
    }));
    // ENOENT
    assert_eq!(with_job(&shell, id, |job| job.info()), Some(2));
}

#[test]
#[serial]
fn test_missing_program_message_follows_redirect() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("missing.txt");
    let mut shell = detached_shell();

    shell.execute(&format!("jobsh-no-such-program-here > {}", out.display()));

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "command not found: jobsh-no-such-program-here\n"
    );
}

#[test]
#[serial]
fn test_timeout_terminates_foreground_job() {
    let mut shell = detached_shell();
    let started = Instant::now();

    shell.execute("timeout 1 sleep 10");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(shell.control().store().lock().is_empty());
}

#[test]
#[serial]
fn test_timeout_signals_background_job() {
    let mut shell = detached_shell();
    shell.execute("timeout 1 sleep 10 &");
    let id = only_job(&shell);
    assert_eq!(with_job(&shell, id, |job| job.timeout), Some(1));

    assert!(wait_until(&shell, Duration::from_secs(5), |shell| {
        shell.control().status_of(id) == Some(JobStatus::Signaled)
    }));
    assert_eq!(
        with_job(&shell, id, |job| job.info()),
        Some(Signal::SIGTERM as i32)
    );
}

#[test]
#[serial]
fn test_stopped_background_job_can_be_continued() {
    let mut shell = detached_shell();
    shell.execute("sleep 10 &");
    let id = only_job(&shell);
    let pgid = with_job(&shell, id, |job| job.pgid()).flatten().unwrap();

    killpg(pgid, Signal::SIGSTOP).unwrap();
    assert!(wait_until(&shell, Duration::from_secs(5), |shell| {
        shell.control().status_of(id) == Some(JobStatus::Stopped)
    }));
    assert_eq!(
        shell.control().drain_notifications(),
        vec!["[1]\tStopped        \tsleep 10 &".to_string()]
    );

    let report = shell.control().send_to_background(id).unwrap();
    assert_eq!(
        report,
        format!("Background job ... pid : {}, command : sleep 10 &", pgid)
    );
    assert_eq!(shell.control().status_of(id), Some(JobStatus::Running));

    kill_job(&shell, id);
}

#[test]
#[serial]
fn test_foreground_resumes_stopped_job() {
    let mut shell = detached_shell();
    shell.execute("sleep 0.3 &");
    let id = only_job(&shell);
    let pgid = with_job(&shell, id, |job| job.pgid()).flatten().unwrap();

    killpg(pgid, Signal::SIGSTOP).unwrap();
    assert!(wait_until(&shell, Duration::from_secs(5), |shell| {
        shell.control().status_of(id) == Some(JobStatus::Stopped)
    }));

    let report = shell.control().bring_to_foreground(id).unwrap();
    assert_eq!(
        report,
        format!("Foreground job ... pid : {}, command : sleep 0.3 &, exited : 0", pgid)
    );
    assert!(shell.control().store().lock().is_empty());
}

#[test]
#[serial]
fn test_round_robin_launch_shares_one_group() {
    let mut shell = detached_shell();
    shell.execute("rr 3 sleep 10 &");
    let id = only_job(&shell);

    let (replicas, pgid, pids) = with_job(&shell, id, |job| {
        let pids: Vec<_> = job.processes().iter().filter_map(|p| p.pid).collect();
        (job.replicas(), job.pgid(), pids)
    })
    .unwrap();
    assert_eq!(replicas, 3);
    assert_eq!(pids.len(), 3);
    assert_eq!(pgid, Some(pids[0]));
    assert!(with_job(&shell, id, |job| job.is_round_robin() && !job.foreground).unwrap());

    kill_job(&shell, id);
    assert!(shell.control().drain_notifications()[0].contains("Signaled"));
}

#[test]
#[serial]
fn test_respawnable_job_is_relaunched() {
    let mut shell = detached_shell();
    shell.execute("true +");
    let first = only_job(&shell);

    let relaunched = wait_until(&shell, Duration::from_secs(5), |shell| {
        shell.control().store().lock().iter().any(|job| job.id != first)
    });
    assert!(relaunched);
    assert!(shell.control().status_of(first).is_none());

    let store = shell.control().store().lock();
    assert!(store.iter().all(|job| job.command() == "true +" && job.respawnable));
}
