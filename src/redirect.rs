//! Standard stream redirection
//!
//! A [`Redirection`] names one standard stream and the file that should
//! replace it. Everything `apply` needs is prepared up front so it can run
//! in a freshly forked child without allocating.

use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use std::ffi::{CString, NulError, OsStr};
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;
use thiserror::Error;

/// Which standard stream a redirection replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
}

impl Stream {
    /// Map a redirection marker token to its stream
    pub fn from_marker(token: &str) -> Option<Stream> {
        match token {
            "<" => Some(Stream::Stdin),
            ">" => Some(Stream::Stdout),
            _ => None,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Stream::Stdin => "<",
            Stream::Stdout => ">",
        }
    }

    pub fn fd(self) -> RawFd {
        match self {
            Stream::Stdin => libc::STDIN_FILENO,
            Stream::Stdout => libc::STDOUT_FILENO,
        }
    }

    fn open_flags(self) -> OFlag {
        match self {
            Stream::Stdin => OFlag::O_RDONLY,
            Stream::Stdout => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectError {
    #[error("cannot open: {0}")]
    Open(Errno),
    #[error("cannot rebind stream: {0}")]
    Rebind(Errno),
}

impl RedirectError {
    pub fn errno(self) -> Errno {
        match self {
            RedirectError::Open(errno) | RedirectError::Rebind(errno) => errno,
        }
    }
}

/// A single `<` or `>` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    stream: Stream,
    target: CString,
}

impl Redirection {
    pub fn new(stream: Stream, target: &str) -> Result<Self, NulError> {
        Ok(Redirection {
            stream,
            target: CString::new(target)?,
        })
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    pub fn target(&self) -> &Path {
        Path::new(OsStr::from_bytes(self.target.to_bytes()))
    }

    /// Replace this process's selected standard stream with the target file.
    ///
    /// The replacement lasts for the lifetime of the process, so this is
    /// only called in a child that is about to exec.
    pub fn apply(&self) -> Result<(), RedirectError> {
        self.rebind(self.stream.fd())
    }

    /// Open the target and install it as `target_fd`.
    ///
    /// The open is non-blocking so a FIFO without a peer fails instead of
    /// hanging; the flag is cleared again before the descriptor is handed on.
    pub(crate) fn rebind(&self, target_fd: RawFd) -> Result<(), RedirectError> {
        let flags = self.stream.open_flags() | OFlag::O_NONBLOCK;
        let mode = Mode::from_bits_truncate(0o644);
        let fd = open(self.target.as_c_str(), flags, mode).map_err(RedirectError::Open)?;

        let result = clear_nonblocking(fd).and_then(|()| {
            if fd == target_fd {
                return Ok(());
            }
            dup2(fd, target_fd).map(drop).map_err(RedirectError::Rebind)
        });

        if fd != target_fd {
            let _ = close(fd);
        }
        result
    }
}

fn clear_nonblocking(fd: RawFd) -> Result<(), RedirectError> {
    let bits = fcntl(fd, FcntlArg::F_GETFL).map_err(RedirectError::Open)?;
    let flags = OFlag::from_bits_truncate(bits) & !OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags))
        .map(drop)
        .map_err(RedirectError::Open)
}
