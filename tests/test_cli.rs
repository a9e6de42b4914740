//! End-to-end tests of the minish binary

use assert_cmd::Command;
use predicates::prelude::*;

fn minish() -> Command {
    let mut cmd = Command::cargo_bin("minish").unwrap();
    cmd.env("PATH", "/usr/bin:/bin").env_remove("MINISH_LOG");
    cmd
}

#[test]
fn test_piped_session_has_no_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();

    minish()
        .current_dir(&canonical)
        .write_stdin("pwd\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", canonical.display())));
}

#[test]
fn test_end_of_input_exits_cleanly() {
    minish()
        .write_stdin("help\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("exit - exit the command shell"));
}

#[test]
fn test_not_found_diagnostic() {
    minish()
        .write_stdin("minish_definitely_missing\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "minish: minish_definitely_missing: command not found",
        ));
}

#[test]
fn test_child_output_ordering() {
    minish()
        .write_stdin("echo first\n?\necho last\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("first\n? - show this help menu\n"))
        .stdout(predicate::str::ends_with("last\n"));
}

#[test]
fn test_dash_c_returns_command_status() {
    minish().args(["-c", "sh", "-c", "'exit 7'"]).assert().code(7);
}

#[test]
fn test_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.msh");
    let out = dir.path().join("out.txt");
    std::fs::write(
        &script,
        format!("echo > {} from script\nexit\necho never\n", out.display()),
    )
    .unwrap();

    minish().arg(&script).assert().success().stdout("");
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "from script\n");
}

#[test]
fn test_missing_script() {
    minish()
        .arg("/minish/no/such/script")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/minish/no/such/script"));
}

#[test]
fn test_version_and_help() {
    minish()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("minish "));
    minish()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE:"));
}
