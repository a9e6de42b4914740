//! Terminal ownership for interactive sessions
//!
//! [`TerminalGuard::acquire`] runs once at startup: it waits until the
//! shell's process group is in the foreground, takes control of the
//! terminal and saves its modes. Dropping the guard puts the saved modes
//! back. Nothing else touches terminal state.

use nix::errno::Errno;
use std::io::{self, IsTerminal};
use std::os::unix::io::RawFd;
use tracing::debug;

pub struct TerminalGuard {
    fd: RawFd,
    saved: libc::termios,
}

impl TerminalGuard {
    /// Take the terminal on standard input. Returns `None` when standard
    /// input is not a terminal.
    pub fn acquire() -> Result<Option<Self>, Errno> {
        if !io::stdin().is_terminal() {
            return Ok(None);
        }
        let fd = libc::STDIN_FILENO;

        // If we were started in the background, stop until moved to the
        // foreground (SIGCONT resumes us and we check again).
        let pgrp = unsafe { libc::getpgrp() };
        loop {
            let foreground = unsafe { libc::tcgetpgrp(fd) };
            if foreground == -1 {
                return Err(Errno::last());
            }
            if foreground == pgrp {
                break;
            }
            if unsafe { libc::killpg(pgrp, libc::SIGTTIN) } == -1 {
                return Err(Errno::last());
            }
        }

        if unsafe { libc::tcsetpgrp(fd, pgrp) } == -1 {
            return Err(Errno::last());
        }

        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut saved) } != 0 {
            return Err(Errno::last());
        }

        debug!(pgrp, "acquired terminal");
        Ok(Some(TerminalGuard { fd, saved }))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSADRAIN, &self.saved);
        }
    }
}
