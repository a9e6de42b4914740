//! Integration tests for cd and pwd
//!
//! These change the process working directory, so each one holds the shared
//! lock and restores the original directory before returning.

#[path = "common/mod.rs"]
mod common;
use common::{cwd_lock, run_with, shell};
use std::env;
use std::path::PathBuf;

struct RestoreDir(PathBuf);

impl Drop for RestoreDir {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.0);
    }
}

fn output(sh: &minish::Shell<Vec<u8>>) -> String {
    String::from_utf8_lossy(sh.output()).into_owned()
}

#[test]
fn test_pwd_prints_exactly_one_line() {
    let _lock = cwd_lock();
    let mut sh = shell();
    let status = run_with(&mut sh, "pwd\nexit\n");
    assert_eq!(status, 0);

    let expected = format!("{}\n", env::current_dir().unwrap().display());
    assert_eq!(output(&sh), expected);
}

#[test]
fn test_cd_then_pwd() {
    let _lock = cwd_lock();
    let _restore = RestoreDir(env::current_dir().unwrap());
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();

    let mut sh = shell();
    run_with(&mut sh, &format!("cd {}\npwd\n", dir.path().display()));

    let printed = PathBuf::from(output(&sh).trim_end());
    assert_eq!(printed.canonicalize().unwrap(), canonical);
    assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), canonical);
}

#[test]
fn test_cd_to_missing_directory_keeps_cwd() {
    let _lock = cwd_lock();
    let before = env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let mut sh = shell();
    let status = run_with(&mut sh, &format!("cd {}\npwd\n", missing.display()));
    assert_eq!(status, 0);
    assert_eq!(sh.last_status(), 0);
    assert_eq!(env::current_dir().unwrap(), before);
    assert_eq!(output(&sh), format!("{}\n", before.display()));
}

#[test]
fn test_cd_failure_status() {
    let _lock = cwd_lock();
    let mut sh = shell();
    sh.execute_line("cd /minish/does/not/exist");
    assert_eq!(sh.last_status(), 1);
}

#[test]
fn test_cd_affects_child_processes() {
    let _lock = cwd_lock();
    let _restore = RestoreDir(env::current_dir().unwrap());
    let dir = tempfile::tempdir().unwrap();

    let mut sh = shell();
    sh.execute_line(&format!("cd {}", dir.path().display()));
    sh.execute_line("touch created_here");
    assert_eq!(sh.last_status(), 0);
    assert!(dir.path().join("created_here").exists());
}

#[test]
fn test_pwd_in_removed_directory_prints_nothing() {
    let _lock = cwd_lock();
    let _restore = RestoreDir(env::current_dir().unwrap());
    let dir = tempfile::tempdir().unwrap();
    let doomed = dir.path().join("doomed");
    std::fs::create_dir(&doomed).unwrap();
    env::set_current_dir(&doomed).unwrap();
    std::fs::remove_dir(&doomed).unwrap();

    let mut sh = shell();
    sh.execute_line("pwd");
    assert_eq!(sh.last_status(), 1);
    assert!(output(&sh).is_empty());
}
