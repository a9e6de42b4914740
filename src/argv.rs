//! Argument vector construction
//!
//! Builds the null-terminated `argv` handed to `execv`. argv[0] is the
//! resolved path rather than the typed name. A `>` or `<` in the second
//! position, together with the token after it, becomes a [`Redirection`]
//! instead of being passed to the program.

use crate::redirect::{Redirection, Stream};
use std::collections::TryReserveError;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgvError {
    #[error("argument contains a NUL byte: {0:?}")]
    Nul(String),
    #[error("{0}: missing redirection target")]
    MissingTarget(Stream),
    #[error("out of memory building the argument vector")]
    OutOfMemory(#[from] TryReserveError),
}

/// Owned C strings plus the null-terminated pointer array `execv` reads.
///
/// The pointers address the heap buffers of `args`, which stay put when the
/// vector itself moves.
#[derive(Debug)]
pub struct ArgumentVector {
    args: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl ArgumentVector {
    fn new(args: Vec<CString>) -> Result<Self, ArgvError> {
        let mut ptrs = Vec::new();
        ptrs.try_reserve_exact(args.len() + 1)?;
        ptrs.extend(args.iter().map(|arg| arg.as_ptr()));
        ptrs.push(ptr::null());
        Ok(ArgumentVector { args, ptrs })
    }

    /// The path to exec (argv[0])
    pub fn program(&self) -> &CStr {
        &self.args[0]
    }

    pub fn args(&self) -> &[CString] {
        &self.args
    }

    /// Number of arguments, not counting the null sentinel
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Pointer to the null-terminated array, valid while `self` is alive
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }

    /// Arguments as lossy UTF-8, for logging and tests
    pub fn to_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

/// Everything the launcher needs for one external command
#[derive(Debug)]
pub struct Invocation {
    pub argv: ArgumentVector,
    pub redirection: Option<Redirection>,
}

/// Build the argument vector for `tokens`, with argv[0] set to `resolved_path`
pub fn build(resolved_path: &Path, tokens: &[String]) -> Result<Invocation, ArgvError> {
    let marker = tokens.get(1).and_then(|token| Stream::from_marker(token));

    let (redirection, rest) = match marker {
        Some(stream) => {
            let target = tokens.get(2).ok_or(ArgvError::MissingTarget(stream))?;
            let redirection =
                Redirection::new(stream, target).map_err(|_| ArgvError::Nul(target.clone()))?;
            (Some(redirection), tokens.get(3..).unwrap_or_default())
        }
        None => (None, tokens.get(1..).unwrap_or_default()),
    };

    let mut args = Vec::new();
    args.try_reserve_exact(rest.len() + 1)?;

    let program = resolved_path.as_os_str().as_bytes();
    args.push(
        CString::new(program)
            .map_err(|_| ArgvError::Nul(resolved_path.display().to_string()))?,
    );
    for token in rest {
        args.push(CString::new(token.as_bytes()).map_err(|_| ArgvError::Nul(token.clone()))?);
    }

    Ok(Invocation {
        argv: ArgumentVector::new(args)?,
        redirection,
    })
}
