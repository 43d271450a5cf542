//! End-to-end tests for the `fvp` binary
//!
//! Each test runs against a private list file with HOME and XDG dirs pointed
//! into a temp dir, so logs and configs never touch the real environment.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn list_file(temp: &TempDir) -> PathBuf {
    temp.path().join("tasks.fvp")
}

fn bare(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fvp").expect("binary builds");
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("XDG_DATA_HOME", temp.path().join("data"))
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn fvp(temp: &TempDir) -> Command {
    let mut cmd = bare(temp);
    cmd.arg("-f").arg(list_file(temp));
    cmd
}

fn add_all(temp: &TempDir, texts: &[&str]) {
    for text in texts {
        fvp(temp).args(["add", text]).assert().success();
    }
}

fn read_list(temp: &TempDir) -> String {
    fs::read_to_string(list_file(temp)).unwrap()
}

// =============================================================================
// Listing and editing
// =============================================================================

#[test]
fn test_list_empty() {
    let temp = TempDir::new().unwrap();
    fvp(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no tasks yet)"));

    // First use creates the file with its header
    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n");
}

#[test]
fn test_add_and_list() {
    let temp = TempDir::new().unwrap();
    fvp(&temp)
        .args(["add", "  write report "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added: [1] write report"));
    add_all(&temp, &["file taxes"]);

    fvp(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("  1. [ ] write report"))
        .stdout(predicate::str::contains("  2. [ ] file taxes"));
}

#[test]
fn test_add_empty_text_fails() {
    let temp = TempDir::new().unwrap();
    fvp(&temp)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task text cannot be empty"));
}

#[test]
fn test_edit_replaces_text() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["draft"]);
    fvp(&temp)
        .args(["edit", "1", "final"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Edited 1."));
    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[ ] final\n");
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a"]);
    let output = fvp(&temp).args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["index"], 1);
    assert_eq!(rows[0]["text"], "a");
    assert_eq!(rows[0]["status"], "open");
    assert_eq!(rows[0]["flags"][0], "root");
}

// =============================================================================
// Scanning
// =============================================================================

#[test]
fn test_next_recommends_preferred_task() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b", "c"]);

    fvp(&temp)
        .arg("next")
        .write_stdin("y\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Do you want to do [2] b more than [1] a?"))
        .stdout(predicate::str::contains("Do you want to do [3] c more than [2] b?"))
        .stdout(predicate::str::contains("-> Do this now: [2] b"));

    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[.] a\n[.] b\n[ ] c\n");
}

#[test]
fn test_next_quit_keeps_dots() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b", "c"]);

    fvp(&temp)
        .arg("next")
        .write_stdin("y\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scan stopped. Run `next` to resume."));

    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[.] a\n[.] b\n[ ] c\n");
}

#[test]
fn test_next_end_of_input_cancels() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b"]);

    fvp(&temp)
        .arg("next")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scan stopped."));
}

#[test]
fn test_next_without_live_tasks() {
    let temp = TempDir::new().unwrap();
    fvp(&temp)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no live tasks)"));
}

#[test]
fn test_next_stale_pointer_resets() {
    let temp = TempDir::new().unwrap();
    fs::write(list_file(&temp), "# FVP_STATE last_did=2\n[ ] a\n[x] b\n[.] c\n").unwrap();

    fvp(&temp)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dots were stale; reset."));

    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[ ] a\n[x] b\n[ ] c\n");
}

#[test]
fn test_done_then_resume_scan() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b", "c", "d"]);
    fvp(&temp).arg("next").write_stdin("n\ny\nn\n").assert().success();

    fvp(&temp)
        .args(["done", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked done: 3."));
    assert!(read_list(&temp).starts_with("# FVP_STATE last_did=3\n"));

    fvp(&temp)
        .args(["list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  1. [.] a  <- ROOT, BENCHMARK"))
        .stdout(predicate::str::contains("  3. [x] c  <- JUST-DID"));

    // The resume pass asks about d against the root
    fvp(&temp)
        .arg("next")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Do you want to do [4] d more than [1] a?"))
        .stdout(predicate::str::contains("-> Do this now: [1] a"));
}

#[test]
fn test_done_root_resets_dots() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b"]);
    fvp(&temp).arg("next").write_stdin("y\n").assert().success();

    fvp(&temp)
        .args(["done", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(root finished -> dots reset)"));
    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[x] a\n[ ] b\n");
}

#[test]
fn test_done_rejects_bad_index() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b"]);

    fvp(&temp)
        .args(["done", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Index 5 out of range (1-2)"));

    fvp(&temp).args(["done", "1"]).assert().success();
    fvp(&temp)
        .args(["done", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task 1 is already done"));
}

#[test]
fn test_done_on_empty_list() {
    let temp = TempDir::new().unwrap();
    fvp(&temp)
        .args(["done", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tasks in list"));
}

// =============================================================================
// Other actions
// =============================================================================

#[test]
fn test_stop_and_bump_alias() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b"]);

    fvp(&temp)
        .args(["stop", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped and re-added at bottom: 1 -> 3."));
    fvp(&temp)
        .args(["bump", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 -> 4."));

    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[x] a\n[x] b\n[ ] a\n[ ] b\n");
}

#[test]
fn test_reset_and_clean() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b", "c"]);
    fvp(&temp).arg("next").write_stdin("y\ny\n").assert().success();
    fvp(&temp).args(["done", "3"]).assert().success();

    fvp(&temp)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 crossed-out tasks."));
    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[.] a\n[.] b\n");

    fvp(&temp)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared dots and scanning state."));
    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[ ] a\n[ ] b\n");
}

#[test]
fn test_archive_appends_to_sidecar() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b"]);

    fvp(&temp).args(["archive", "1"]).assert().success();
    assert_eq!(read_list(&temp), "# FVP_STATE last_did=-1\n[ ] b\n");

    let archive = fs::read_to_string(temp.path().join("tasks.fvp.archive")).unwrap();
    assert_eq!(archive, "[x] a\n");
}

#[test]
fn test_shuffle_keeps_done_at_end() {
    let temp = TempDir::new().unwrap();
    add_all(&temp, &["a", "b", "c"]);
    fvp(&temp).args(["done", "1"]).assert().success();

    fvp(&temp).arg("shuffle").assert().success();
    let content = read_list(&temp);
    assert!(content.ends_with("[x] a\n"));
    assert!(!content.contains("[.]"));
}

#[test]
fn test_path_prints_absolute_file() {
    let temp = TempDir::new().unwrap();
    fvp(&temp)
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::ends_with("tasks.fvp\n"));
}

#[test]
fn test_named_lists_from_config() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("fvp.yml");
    fs::write(&config, format!("lists-dir: {}\n", temp.path().join("lists").display())).unwrap();

    bare(&temp)
        .arg("-c")
        .arg(&config)
        .args(["-L", "work", "add", "ship it"])
        .assert()
        .success();
    assert!(temp.path().join("lists").join("work.fvp").exists());

    bare(&temp)
        .arg("-c")
        .arg(&config)
        .arg("lists")
        .assert()
        .success()
        .stdout(predicate::str::contains("work"))
        .stdout(predicate::str::contains("1 live"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let temp = TempDir::new().unwrap();
    bare(&temp)
        .args(["-c", "missing.yml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}
