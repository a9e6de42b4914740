//! Common test utilities for minish integration tests

use std::io::Cursor;
use std::sync::{Mutex, MutexGuard};

pub use minish::repl::{BoundedLines, MAX_LINE_LEN};
pub use minish::{Shell, ShellConfig};

/// Search path used by tests that launch system programs
pub const TEST_PATH: &str = "/usr/bin:/bin";

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that change the process working directory
#[allow(dead_code)]
pub fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A non-interactive shell that captures built-in output
pub fn shell() -> Shell<Vec<u8>> {
    let config = ShellConfig {
        path_env: Some(TEST_PATH.to_string()),
        ..ShellConfig::default()
    };
    Shell::new(config, Vec::new())
}

/// Feed `input` through a fresh shell, returning (exit status, built-in output)
#[allow(dead_code)]
pub fn run(input: &str) -> (i32, String) {
    let mut sh = shell();
    let status = run_with(&mut sh, input);
    (status, String::from_utf8(sh.into_output()).unwrap())
}

/// Feed `input` through an existing shell
pub fn run_with(sh: &mut Shell<Vec<u8>>, input: &str) -> i32 {
    let mut source = BoundedLines::new(Cursor::new(input.as_bytes().to_vec()), MAX_LINE_LEN);
    sh.run(&mut source).unwrap()
}
