/*!
 * Built-in Tests
 * Inline and forked built-ins driven through the shell
 */

use super::support::{detached_shell, kill_job, only_job, wait_until};
use jobsh::builtins::handlers;
use jobsh::builtins::Invocation;
use jobsh::{JobId, JobStatus, ShellError};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn words(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

#[test]
#[serial]
fn test_inline_builtin_leaves_no_job() {
    let mut shell = detached_shell();
    shell.execute("fg");
    shell.execute("bg 2");
    assert!(shell.control().store().lock().is_empty());
    assert!(shell.is_running());

    shell.execute("exit");
    assert!(!shell.is_running());
}

#[test]
#[serial]
fn test_fg_and_bg_without_jobs() {
    let shell = detached_shell();
    assert!(matches!(
        shell.control().nth_background(1),
        Err(ShellError::NoPendingJobs)
    ));
}

#[test]
#[serial]
fn test_bg_refuses_running_job() {
    let mut shell = detached_shell();
    shell.execute("sleep 10 &");
    let id = only_job(&shell);

    let args = words("bg 1");
    let invocation = Invocation { job: JobId(0), args: &args };
    let err = handlers::background(&mut shell, &invocation).unwrap_err();
    assert_eq!(err.to_string(), "Job already running.");

    let args = words("bg 4");
    let invocation = Invocation { job: JobId(0), args: &args };
    let err = handlers::background(&mut shell, &invocation).unwrap_err();
    assert_eq!(err.to_string(), "No pending job matches number 4.");

    kill_job(&shell, id);
}

#[test]
#[serial]
fn test_fg_refuses_round_robin_job() {
    let mut shell = detached_shell();
    shell.execute("rr 2 sleep 10 &");
    let id = only_job(&shell);

    let args = words("fg");
    let invocation = Invocation { job: JobId(0), args: &args };
    let err = handlers::foreground(&mut shell, &invocation).unwrap_err();
    assert!(matches!(err, ShellError::RoundRobinForeground));

    kill_job(&shell, id);
}

#[test]
#[serial]
fn test_rr_usage_error_discards_job() {
    let mut shell = detached_shell();
    shell.execute("rr 3");
    shell.execute("timeout x sleep 1");
    assert!(shell.control().store().lock().is_empty());
}

#[test]
#[serial]
fn test_jobs_lists_background_jobs() {
    let dir = TempDir::new().unwrap();
    let listing = dir.path().join("jobs.txt");
    let mut shell = detached_shell();

    shell.execute(&format!("jobs > {}", listing.display()));
    assert_eq!(fs::read_to_string(&listing).unwrap(), "No pending jobs.\n");

    shell.execute("sleep 10 &");
    let id = only_job(&shell);
    shell.execute(&format!("jobs > {}", listing.display()));
    assert_eq!(
        fs::read_to_string(&listing).unwrap(),
        "[1]\tRunning        \tsleep 10 &\n"
    );

    kill_job(&shell, id);
}

#[test]
#[serial]
fn test_history_is_numbered() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("history.txt");
    let mut shell = detached_shell();

    shell.execute("true");
    shell.execute(&format!("history > {}", out.display()));

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "   1  true");
    assert!(lines[1].starts_with("   2  history > "));
}

#[test]
#[serial]
fn test_children_prints_census() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("children.txt");
    let mut shell = detached_shell();

    shell.execute(&format!("children > {}", out.display()));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("PID\tPPID\tTHREADS\tCHILDREN\tCOMMAND\n"));
    assert!(text.lines().count() > 1);
}

#[test]
#[serial]
fn test_cd_changes_directory() {
    let original = env::current_dir().unwrap();
    let dir = TempDir::new().unwrap();
    let mut shell = detached_shell();

    shell.execute(&format!("cd {}", dir.path().display()));
    assert_eq!(
        env::current_dir().unwrap().canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );

    env::set_current_dir(original).unwrap();
}

#[test]
#[serial]
fn test_forked_builtin_in_background_completes() {
    let mut shell = detached_shell();
    shell.execute("history &");
    let id = only_job(&shell);

    assert!(wait_until(&shell, Duration::from_secs(5), |shell| {
        shell.control().status_of(id) == Some(JobStatus::Completed)
    }));
}
