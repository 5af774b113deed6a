/*!
 * Child Output
 *
 * Unbuffered writers over the standard descriptors for use after fork.
 * Writes go straight to the descriptor with write(2); no std stdio lock or
 * output capture is involved.
 */

use nix::errno::Errno;
use nix::libc::{STDERR_FILENO, STDOUT_FILENO};
use std::io::{self, Write};
use std::os::fd::BorrowedFd;

#[derive(Debug, Clone, Copy)]
pub struct FdWriter {
    fd: BorrowedFd<'static>,
}

impl FdWriter {
    pub fn stdout() -> Self {
        // SAFETY: the standard descriptors are never closed by this crate.
        Self {
            fd: unsafe { BorrowedFd::borrow_raw(STDOUT_FILENO) },
        }
    }

    pub fn stderr() -> Self {
        // SAFETY: as above.
        Self {
            fd: unsafe { BorrowedFd::borrow_raw(STDERR_FILENO) },
        }
    }
}

impl Write for FdWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match nix::unistd::write(self.fd, buf) {
                Err(Errno::EINTR) => continue,
                result => return result.map_err(io::Error::from),
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
