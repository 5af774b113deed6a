/*!
 * Built-in Handlers
 */

use super::history::History;
use super::table::{Invocation, Snapshot};
use crate::core::{ShellError, ShellResult};
use crate::jobs::JobStatus;
use crate::parser::LaunchPlan;
use crate::process::{census, FdWriter};
use crate::shell::Shell;
use std::env;
use std::io::Write;
use std::path::PathBuf;

pub fn exit(shell: &mut Shell, _invocation: &Invocation<'_>) -> ShellResult<()> {
    shell.request_exit();
    Ok(())
}

/// `fg [n]`
pub fn foreground(shell: &mut Shell, invocation: &Invocation<'_>) -> ShellResult<()> {
    let n = job_number(invocation.args)?;
    let control = shell.control();
    let id = control.nth_background(n)?;
    let report = control.bring_to_foreground(id)?;
    println!("{report}");
    Ok(())
}

/// `bg [n]`
pub fn background(shell: &mut Shell, invocation: &Invocation<'_>) -> ShellResult<()> {
    let n = job_number(invocation.args)?;
    let control = shell.control();
    let id = control.nth_background(n)?;
    if matches!(control.status_of(id), Some(JobStatus::Running)) {
        return Err(ShellError::JobAlreadyRunning);
    }
    let report = control.send_to_background(id)?;
    println!("{report}");
    Ok(())
}

/// `cd [dir]`, defaulting to $HOME
pub fn change_directory(_shell: &mut Shell, invocation: &Invocation<'_>) -> ShellResult<()> {
    let target = match invocation.args.get(1) {
        Some(dir) => PathBuf::from(dir),
        None => env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| ShellError::Usage("cd: HOME is not set".into()))?,
    };

    env::set_current_dir(&target)
        .map_err(|err| ShellError::Usage(format!("cd: {}: {}", target.display(), err)))?;
    println!("Directory changed to \"{}\"", target.display());
    Ok(())
}

/// `rr <replicas> <command>`
pub fn round_robin(shell: &mut Shell, invocation: &Invocation<'_>) -> ShellResult<()> {
    launch_with_plan(shell, invocation)
}

/// `timeout <seconds> <command>`
pub fn timeout(shell: &mut Shell, invocation: &Invocation<'_>) -> ShellResult<()> {
    launch_with_plan(shell, invocation)
}

fn launch_with_plan(shell: &mut Shell, invocation: &Invocation<'_>) -> ShellResult<()> {
    let plan = LaunchPlan::parse(invocation.args)?;
    let report = shell.control().start(invocation.job, plan)?;
    println!("{report}");
    Ok(())
}

pub fn jobs(_args: &[String], snapshot: &Snapshot, out: &mut dyn Write) -> i32 {
    let text = if snapshot.jobs.is_empty() {
        format!("{}\n", ShellError::NoPendingJobs)
    } else {
        join_lines(&snapshot.jobs)
    };
    emit(out, &text)
}

pub fn history(_args: &[String], snapshot: &Snapshot, out: &mut dyn Write) -> i32 {
    emit(out, &join_lines(&History::lines(&snapshot.history)))
}

pub fn children(_args: &[String], _snapshot: &Snapshot, out: &mut dyn Write) -> i32 {
    match census::take_census() {
        Ok(entries) => emit(out, &join_lines(&census::render(&entries))),
        Err(err) => {
            let _ = writeln!(FdWriter::stderr(), "children: {err}");
            1
        }
    }
}

fn join_lines(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

/// Write the whole text at once; a failed write fails the built-in
fn emit(out: &mut dyn Write, text: &str) -> i32 {
    match out.write_all(text.as_bytes()) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Job number argument of `fg`/`bg`, 1 when absent
fn job_number(args: &[String]) -> ShellResult<usize> {
    match args.get(1) {
        None => Ok(1),
        Some(raw) => raw
            .parse()
            .map_err(|_| ShellError::Usage(format!("{}: invalid job number '{}'", args[0], raw))),
    }
}
