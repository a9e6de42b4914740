//! Executor: runs external programs
//!
//! One command is one `fork`: the child applies its redirection and calls
//! `execv`, the parent blocks in `waitpid` until the child is gone. If the
//! child cannot get as far as running the program it writes what went wrong
//! to a close-on-exec pipe and exits with a non-zero status, so the parent
//! can tell "ran and failed" from "never ran".
//!
//! Nothing between `fork` and `execv` allocates: the argument vector, the
//! redirection target and the report pipe all exist before the fork.

use crate::argv::ArgumentVector;
use crate::redirect::{RedirectError, Redirection};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, pipe2, ForkResult, Pid};
use std::fs::File;
use std::io::Read;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use thiserror::Error;
use tracing::{debug, warn};

/// Exit status of a child whose redirection could not be set up
pub const REDIRECT_FAILED_STATUS: i32 = 1;
/// Exit status of a child whose program could not be executed
pub const LAUNCH_FAILED_STATUS: i32 = 126;
/// Exit status of a child whose program does not exist
pub const NOT_FOUND_STATUS: i32 = 127;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("fork failed: {0}")]
    ForkFailed(Errno),
    #[error("{path}: {source}")]
    LaunchFailed { path: String, source: Errno },
    #[error("{path}: {source}")]
    RedirectionFailed { path: String, source: RedirectError },
    #[error("cannot create status pipe: {0}")]
    Pipe(Errno),
    #[error("wait failed: {0}")]
    WaitFailed(Errno),
}

impl LaunchError {
    /// Status the command loop records for this failure
    pub fn status(&self) -> i32 {
        match self {
            LaunchError::LaunchFailed { source, .. } => exec_failure_status(*source),
            _ => REDIRECT_FAILED_STATUS,
        }
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited(i32),
    Signaled(Signal),
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }

    /// Shell-style status: the exit code, or 128 + signal number
    pub fn code(&self) -> i32 {
        match *self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(signal) => 128 + signal as i32,
        }
    }
}

fn exec_failure_status(errno: Errno) -> i32 {
    if errno == Errno::ENOENT {
        NOT_FOUND_STATUS
    } else {
        LAUNCH_FAILED_STATUS
    }
}

/// What the child reports when it cannot run the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildFailure {
    Redirect(RedirectError),
    Exec(Errno),
}

const REPORT_LEN: usize = 5;

impl ChildFailure {
    fn encode(self) -> [u8; REPORT_LEN] {
        let (tag, errno) = match self {
            ChildFailure::Redirect(RedirectError::Open(errno)) => (1u8, errno),
            ChildFailure::Redirect(RedirectError::Rebind(errno)) => (2u8, errno),
            ChildFailure::Exec(errno) => (3u8, errno),
        };
        let raw = (errno as i32).to_ne_bytes();
        [tag, raw[0], raw[1], raw[2], raw[3]]
    }

    fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() != REPORT_LEN {
            return None;
        }
        let errno = Errno::from_i32(i32::from_ne_bytes([buf[1], buf[2], buf[3], buf[4]]));
        match buf[0] {
            1 => Some(ChildFailure::Redirect(RedirectError::Open(errno))),
            2 => Some(ChildFailure::Redirect(RedirectError::Rebind(errno))),
            3 => Some(ChildFailure::Exec(errno)),
            _ => None,
        }
    }

    fn exit_status(self) -> i32 {
        match self {
            ChildFailure::Redirect(_) => REDIRECT_FAILED_STATUS,
            ChildFailure::Exec(errno) => exec_failure_status(errno),
        }
    }

    /// Async-signal-safe write of the report
    fn send(self, fd: RawFd) {
        let bytes = self.encode();
        unsafe {
            libc::write(fd, bytes.as_ptr().cast(), bytes.len());
        }
    }

    fn into_error(self, argv: &ArgumentVector, redirection: Option<&Redirection>) -> LaunchError {
        match self {
            ChildFailure::Exec(source) => LaunchError::LaunchFailed {
                path: argv.program().to_string_lossy().into_owned(),
                source,
            },
            ChildFailure::Redirect(source) => LaunchError::RedirectionFailed {
                path: redirection
                    .map(|r| r.target().display().to_string())
                    .unwrap_or_default(),
                source,
            },
        }
    }
}

/// Run `argv` in a child process and wait for it to finish
pub fn execute(
    argv: &ArgumentVector,
    redirection: Option<&Redirection>,
) -> Result<ExitOutcome, LaunchError> {
    let (report_rx, report_tx) = report_pipe().map_err(LaunchError::Pipe)?;

    // SAFETY: the child only calls async-signal-safe functions before it
    // either execs or exits.
    match unsafe { fork() } {
        Err(errno) => Err(LaunchError::ForkFailed(errno)),
        Ok(ForkResult::Child) => {
            drop(report_rx);
            let failure = exec_child(argv, redirection);
            failure.send(report_tx.as_raw_fd());
            unsafe { libc::_exit(failure.exit_status()) }
        }
        Ok(ForkResult::Parent { child }) => {
            drop(report_tx);
            debug!(pid = child.as_raw(), argv = ?argv.to_strings(), "forked");

            let failure = read_report(report_rx);
            let outcome = wait_for(child)?;
            debug!(pid = child.as_raw(), ?outcome, "collected");

            match failure {
                Some(failure) => Err(failure.into_error(argv, redirection)),
                None => Ok(outcome),
            }
        }
    }
}

/// Child side: returns only if the program could not be started
fn exec_child(argv: &ArgumentVector, redirection: Option<&Redirection>) -> ChildFailure {
    if let Some(redirection) = redirection {
        if let Err(e) = redirection.apply() {
            return ChildFailure::Redirect(e);
        }
    }
    unsafe {
        libc::execv(argv.program().as_ptr(), argv.as_ptr());
    }
    ChildFailure::Exec(Errno::last())
}

/// A pipe whose write end closes itself when the child execs
fn report_pipe() -> Result<(OwnedFd, OwnedFd), Errno> {
    // Atomic: a fork on another thread never sees these without FD_CLOEXEC
    let (rx, tx) = pipe2(OFlag::O_CLOEXEC)?;
    // SAFETY: both descriptors were just created and are owned by nothing else
    Ok(unsafe { (OwnedFd::from_raw_fd(rx), OwnedFd::from_raw_fd(tx)) })
}

/// Read the child's report; EOF without data means exec succeeded
fn read_report(rx: OwnedFd) -> Option<ChildFailure> {
    let mut buf = Vec::with_capacity(REPORT_LEN);
    if let Err(e) = File::from(rx).read_to_end(&mut buf) {
        warn!(error = %e, "reading child status report");
        return None;
    }
    ChildFailure::decode(&buf)
}

/// Block until `child` terminates
fn wait_for(child: Pid) -> Result<ExitOutcome, LaunchError> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ExitOutcome::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(ExitOutcome::Signaled(signal)),
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(LaunchError::WaitFailed(errno)),
        }
    }
}
