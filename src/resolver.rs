//! Executable path resolution
//!
//! Turns the first token of a command line into a path to hand to `execv`:
//! 1. A path starting with `/` is used as-is
//! 2. Anything that already exists relative to the working directory is
//!    used as-is (the kernel decides at exec time whether it can run)
//! 3. Otherwise the name is searched in each `PATH` directory, left to right

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, trace};

const SEPARATOR: char = '/';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{0}: command not found")]
    NotFound(String),
}

/// Resolves command names against a fixed search path
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    /// Parsed PATH directories, empty segments removed
    path_dirs: Vec<String>,
}

impl PathResolver {
    /// Create a resolver from a raw `PATH` value. `None` means no search path.
    ///
    /// Empty segments (`a::b`, a leading or trailing `:`) are skipped rather
    /// than read as the current directory.
    pub fn new(path_env: Option<&str>) -> Self {
        let path_dirs = path_env
            .unwrap_or_default()
            .split(':')
            .filter(|dir| !dir.is_empty())
            .map(String::from)
            .collect();

        PathResolver { path_dirs }
    }

    /// Create a resolver from the process environment
    pub fn from_env() -> Self {
        Self::new(env::var("PATH").ok().as_deref())
    }

    /// Directories searched for bare command names, in order
    pub fn search_dirs(&self) -> &[String] {
        &self.path_dirs
    }

    /// Resolve a command name or path
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError> {
        if name.is_empty() {
            return Err(ResolveError::NotFound(String::new()));
        }

        if name.starts_with(SEPARATOR) {
            trace!(name, "absolute path");
            return Ok(PathBuf::from(name));
        }

        match fs::metadata(name) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            probe => {
                trace!(name, exists = probe.is_ok(), "relative path");
                return Ok(PathBuf::from(name));
            }
        }

        match self.search(name) {
            Some(found) => {
                debug!(name, path = %found, "resolved from PATH");
                Ok(PathBuf::from(found))
            }
            None => Err(ResolveError::NotFound(name.to_string())),
        }
    }

    /// First `dir/name` whose status can be read
    fn search(&self, name: &str) -> Option<String> {
        let mut candidate = String::new();
        for dir in &self.path_dirs {
            candidate.clear();
            candidate.push_str(dir);
            if !dir.ends_with(SEPARATOR) {
                candidate.push(SEPARATOR);
            }
            candidate.push_str(name);

            if fs::metadata(&candidate).is_ok() {
                return Some(candidate);
            }
        }
        None
    }
}

/// Resolve `name` against a raw `PATH` value
pub fn resolve(name: &str, path_env: Option<&str>) -> Result<PathBuf, ResolveError> {
    PathResolver::new(path_env).resolve(name)
}
