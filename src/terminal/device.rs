/*!
 * Controlling Terminal
 * Ownership of the terminal's foreground group and its modes
 */

use crate::core::{ShellError, ShellResult};
use crate::signals;
use nix::sys::termios::{tcgetattr, tcsetattr, SetArg, Termios};
use nix::unistd::{getpgrp, getpid, setpgid, tcsetpgrp, Pid};
use parking_lot::Mutex;
use std::io::{self, IsTerminal};
use std::os::fd::{AsFd, OwnedFd};
use tracing::{debug, info};

/// The shell's handle on its controlling terminal
#[derive(Debug)]
pub struct Terminal {
    fd: OwnedFd,
    shell_pgid: Pid,
    shell_mode: Mutex<Termios>,
}

impl Terminal {
    /// Put the shell in its own group and take the terminal.
    ///
    /// Fails when standard input is not a terminal.
    pub fn acquire() -> ShellResult<Self> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(ShellError::NotATerminal);
        }
        let fd = stdin.as_fd().try_clone_to_owned()?;

        let shell_pgid = getpid();
        if let Err(errno) = setpgid(shell_pgid, shell_pgid) {
            // A session leader already leads its own group
            if getpgrp() != shell_pgid {
                return Err(ShellError::Terminal(errno));
            }
        }

        signals::ignore_job_control_signals()?;
        tcsetpgrp(&fd, shell_pgid).map_err(ShellError::Terminal)?;
        let mode = tcgetattr(&fd).map_err(ShellError::Terminal)?;

        info!(pgid = %shell_pgid, "terminal acquired");
        Ok(Self {
            fd,
            shell_pgid,
            shell_mode: Mutex::new(mode),
        })
    }

    pub fn shell_pgid(&self) -> Pid {
        self.shell_pgid
    }

    /// Make `pgid` the terminal's foreground group
    pub fn give_to(&self, pgid: Pid) -> ShellResult<()> {
        debug!(%pgid, "terminal handed to job");
        tcsetpgrp(&self.fd, pgid).map_err(ShellError::Terminal)
    }

    /// Take the terminal back and restore the shell's mode
    pub fn reclaim(&self) -> ShellResult<()> {
        tcsetpgrp(&self.fd, self.shell_pgid).map_err(ShellError::Terminal)?;
        let mode = self.shell_mode.lock();
        tcsetattr(&self.fd, SetArg::TCSADRAIN, &mode).map_err(ShellError::Terminal)
    }

    pub fn current_mode(&self) -> ShellResult<Termios> {
        tcgetattr(&self.fd).map_err(ShellError::Terminal)
    }

    pub fn restore_mode(&self, mode: &Termios) -> ShellResult<()> {
        tcsetattr(&self.fd, SetArg::TCSADRAIN, mode).map_err(ShellError::Terminal)
    }
}
