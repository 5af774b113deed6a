/*!
 * Process Launcher
 *
 * Forks one child per pipeline stage, replica by replica, wiring stage
 * outputs to the next stage's input and placing every child in the job's
 * process group.
 */

use crate::builtins::{BuiltinTable, ForkedHandler, Snapshot};
use crate::core::limits::{FAILED_START_STATUS, REDIRECT_MODE};
use crate::core::{ShellError, ShellResult};
use crate::jobs::{Job, ReplicaIndex, StatusChange};
use super::output::FdWriter;
use crate::signals;
use crate::terminal::Terminal;
use nix::unistd::{dup2, execvp, fork, getpid, pipe, setpgid, ForkResult, Pid};
use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use tracing::{debug, warn};

const STDIN_FILENO: i32 = 0;
const STDOUT_FILENO: i32 = 1;

/// Shared inputs for launching one job
pub struct LaunchContext<'a> {
    pub terminal: Option<&'a Terminal>,
    pub builtins: &'a BuiltinTable,
    pub snapshot: &'a Snapshot,
}

/// Everything a child needs, prepared before the fork
struct ChildSetup<'a> {
    pgid: Option<Pid>,
    foreground: bool,
    terminal: Option<&'a Terminal>,
    stdin: Option<OwnedFd>,
    stdout: Option<OwnedFd>,
    /// Read end of the pipe the child writes to; closed in the child
    unused: Option<OwnedFd>,
    output: Option<&'a Path>,
    args: &'a [String],
    argv: Vec<CString>,
    /// Printed when exec fails
    not_found: String,
    builtin: Option<ForkedHandler>,
    snapshot: &'a Snapshot,
}

/// Start every process of `job`.
///
/// A pipe or fork failure aborts the rest of that replica; stages that never
/// started are closed out so the job can still roll up. The error is returned
/// only when no stage at all could be started.
pub fn spawn_job(job: &mut Job, ctx: &LaunchContext<'_>) -> ShellResult<usize> {
    let mut started = 0;
    let mut failure = None;

    for replica in 0..job.replicas() {
        match spawn_replica(job, replica, ctx) {
            Ok(count) => started += count,
            Err(err) => {
                warn!(job = %job.id, replica, %err, "launch aborted");
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }
    }

    for process in job.processes.iter_mut().filter(|p| p.pid.is_none()) {
        process.advance(StatusChange::Started);
        process.advance(StatusChange::Exited(FAILED_START_STATUS));
    }

    match failure {
        Some(err) if started == 0 => Err(err),
        Some(err) => {
            println!("{err}");
            Ok(started)
        }
        None => Ok(started),
    }
}

fn spawn_replica(job: &mut Job, replica: ReplicaIndex, ctx: &LaunchContext<'_>) -> ShellResult<usize> {
    let stages: Vec<usize> = job
        .processes
        .iter()
        .enumerate()
        .filter(|(_, p)| p.replica == replica)
        .map(|(i, _)| i)
        .collect();

    let mut upstream: Option<OwnedFd> = None;
    let mut started = 0;

    for (position, &index) in stages.iter().enumerate() {
        let last = position + 1 == stages.len();
        let (downstream_read, downstream_write) = if last {
            (None, None)
        } else {
            let (read, write) = pipe().map_err(ShellError::Pipe)?;
            (Some(read), Some(write))
        };

        let process = &job.processes[index];
        if process.program().is_empty() {
            return Err(ShellError::InvalidArgument("empty command in pipeline".into()));
        }
        let argv = to_argv(&process.args)?;
        let not_found = format!("command not found: {}\n", process.program());
        let builtin = ctx.builtins.forked_handler(process.program());

        // SAFETY: the child only performs fd plumbing, group setup and exec
        // (or a forked built-in over captured data) before exiting.
        match unsafe { fork() }.map_err(ShellError::Fork)? {
            ForkResult::Child => run_child(ChildSetup {
                pgid: job.pgid(),
                foreground: job.foreground,
                terminal: ctx.terminal,
                stdin: upstream.take(),
                stdout: downstream_write,
                unused: downstream_read,
                output: process.output.as_deref(),
                args: &process.args,
                argv,
                not_found,
                builtin,
                snapshot: ctx.snapshot,
            }),
            ForkResult::Parent { child } => {
                let pgid = job.record_start(index, child).unwrap_or(child);
                // Also done in the child; whichever runs first wins
                if let Err(errno) = setpgid(child, pgid) {
                    debug!(%child, %pgid, %errno, "parent setpgid raced with exec");
                }
                debug!(job = %job.id, %child, %pgid, replica, "stage started");

                drop(downstream_write);
                upstream = downstream_read;
                started += 1;
            }
        }
    }

    Ok(started)
}

fn to_argv(args: &[String]) -> ShellResult<Vec<CString>> {
    args.iter()
        .map(|arg| {
            CString::new(arg.as_bytes()).map_err(|_| {
                ShellError::InvalidArgument(format!("argument contains a NUL byte: {arg:?}"))
            })
        })
        .collect()
}

fn run_child(setup: ChildSetup<'_>) -> ! {
    let pid = getpid();
    let pgid = setup.pgid.unwrap_or(pid);
    let _ = setpgid(pid, pgid);
    if setup.foreground {
        if let Some(terminal) = setup.terminal {
            let _ = terminal.give_to(pgid);
        }
    }
    signals::restore_default_dispositions();

    if let Some(fd) = setup.stdin {
        let _ = dup2(fd.as_raw_fd(), STDIN_FILENO);
    }
    if let Some(fd) = setup.stdout {
        let _ = dup2(fd.as_raw_fd(), STDOUT_FILENO);
    }
    drop(setup.unused);

    if let Some(path) = setup.output {
        let opened = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(REDIRECT_MODE)
            .open(path);
        match opened {
            Ok(file) => {
                let _ = dup2(file.as_raw_fd(), STDOUT_FILENO);
            }
            Err(err) => {
                let _ = writeln!(FdWriter::stderr(), "{}: {}", path.display(), err);
                exit_child(err.raw_os_error().unwrap_or(FAILED_START_STATUS));
            }
        }
    }

    let status = match setup.builtin {
        Some(handler) => handler(setup.args, setup.snapshot, &mut FdWriter::stdout()),
        None => exec(&setup.argv, &setup.not_found),
    };
    exit_child(status)
}

fn exec(argv: &[CString], not_found: &str) -> i32 {
    let Some(program) = argv.first() else {
        return FAILED_START_STATUS;
    };
    match execvp(program, argv) {
        Ok(never) => match never {},
        Err(errno) => {
            let _ = FdWriter::stdout().write_all(not_found.as_bytes());
            errno as i32
        }
    }
}

fn exit_child(status: i32) -> ! {
    // SAFETY: _exit skips atexit handlers and stdio teardown, which belong
    // to the parent's copy of the process.
    unsafe { nix::libc::_exit(status) }
}
