use assert_cmd::Command;
use minigit_core::{CommitLog, FsStore, Store};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn minigit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("minigit").expect("Failed to find minigit binary");
    cmd.current_dir(dir);
    cmd
}

fn init_repository() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    minigit(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout("Initialized empty MiniGit repository.\n");
    dir
}

fn read_log(dir: &Path) -> CommitLog {
    FsStore::new(dir).read_log().expect("Failed to read commit index")
}

#[test]
fn init_twice_reports_already_initialized() {
    let dir = init_repository();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    minigit(dir.path()).args(["add", "a.txt"]).assert().success();

    let index_before = fs::read(dir.path().join(".minigit").join("commits.json")).unwrap();

    minigit(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout("Repository already initialized.\n");

    let index_after = fs::read(dir.path().join(".minigit").join("commits.json")).unwrap();
    assert_eq!(index_before, index_after);
    assert!(dir
        .path()
        .join(".minigit")
        .join("staging")
        .join("a.txt")
        .is_file());
    assert!(dir.path().join(".minigit").join("log.txt").is_file());
}

#[test]
fn end_to_end_scenario() {
    let dir = init_repository();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    minigit(dir.path())
        .args(["add", "a.txt"])
        .assert()
        .success()
        .stdout("Added 'a.txt' to staging area.\n");

    minigit(dir.path())
        .args(["commit", "first"])
        .assert()
        .success()
        .stdout("Committed: first\n");

    let log = read_log(dir.path());
    assert_eq!(log.len(), 1);
    let record = &log.records()[0];
    assert_eq!(record.files, vec!["a.txt"]);
    assert_eq!(record.message, "first");
    assert!(record.id.starts_with("commit_"));
    assert_eq!(
        fs::read_dir(dir.path().join(".minigit").join("staging"))
            .unwrap()
            .count(),
        0
    );
    assert_eq!(
        fs::read(
            dir.path()
                .join(".minigit")
                .join("commits")
                .join(&record.id)
                .join("a.txt")
        )
        .unwrap(),
        b"hello"
    );

    minigit(dir.path())
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commit 1: commit_"))
        .stdout(predicate::str::contains("Message   : first"))
        .stdout(predicate::str::contains("Files     : a.txt"))
        .stdout(predicate::str::contains("Commit 2").not());

    fs::write(dir.path().join("a.txt"), "hello world").unwrap();

    minigit(dir.path()).arg("status").assert().success().stdout(
        "\n=== Staged for commit ===\n\n=== Modified but not staged ===\n\n=== Untracked files ===\n",
    );
}

#[test]
fn add_missing_file_reports_and_stages_nothing() {
    let dir = init_repository();

    minigit(dir.path())
        .args(["add", "nope.txt"])
        .assert()
        .success()
        .stdout("File 'nope.txt' does not exist.\n");

    assert_eq!(
        fs::read_dir(dir.path().join(".minigit").join("staging"))
            .unwrap()
            .count(),
        0
    );
}

#[test]
fn status_reports_every_section() {
    let dir = init_repository();
    fs::write(dir.path().join("old.txt"), "old").unwrap();
    minigit(dir.path()).args(["add", "old.txt"]).assert().success();
    minigit(dir.path()).args(["commit", "base"]).assert().success();
    fs::remove_file(dir.path().join("old.txt")).unwrap();

    fs::write(dir.path().join("edit.txt"), "v1").unwrap();
    minigit(dir.path()).args(["add", "edit.txt"]).assert().success();
    fs::write(dir.path().join("edit.txt"), "v2").unwrap();
    fs::write(dir.path().join("new.txt"), "new").unwrap();

    minigit(dir.path()).arg("status").assert().success().stdout(
        "
=== Staged for commit ===
  edit.txt

=== Modified but not staged ===
  edit.txt

=== Untracked files ===
  new.txt

=== Deleted files ===
  old.txt
",
    );
}

#[test]
fn log_without_commits() {
    let dir = init_repository();

    minigit(dir.path())
        .arg("log")
        .assert()
        .success()
        .stdout("No commits found.\n");
}

#[test]
fn commands_outside_a_repository() {
    let dir = TempDir::new().unwrap();

    for args in [vec!["add", "a.txt"], vec!["commit", "m"], vec!["log"], vec!["status"]] {
        minigit(dir.path())
            .args(&args)
            .assert()
            .success()
            .stdout(predicate::str::contains("Not a minigit repository"));
    }

    assert!(!dir.path().join(".minigit").exists());
}

#[test]
fn missing_arguments_print_usage() {
    let dir = init_repository();

    minigit(dir.path())
        .arg("add")
        .assert()
        .success()
        .stdout("Usage: minigit add <filename>\n");

    minigit(dir.path())
        .arg("commit")
        .assert()
        .success()
        .stdout("Usage: minigit commit <message>\n");

    minigit(dir.path())
        .assert()
        .success()
        .stdout("Usage: minigit <command> [arguments]\n");
}

#[test]
fn unknown_command_and_help() {
    let dir = TempDir::new().unwrap();

    minigit(dir.path())
        .arg("push")
        .assert()
        .success()
        .stdout("Unknown command: push. Use 'help' to see available commands.\n");

    minigit(dir.path())
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available commands:"))
        .stdout(predicate::str::contains("commit <message>"));
}

#[test]
fn directory_flag_targets_another_workdir() {
    let dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();

    minigit(elsewhere.path())
        .arg("-C")
        .arg(dir.path())
        .arg("init")
        .assert()
        .success();

    assert!(dir.path().join(".minigit").is_dir());
    assert!(!elsewhere.path().join(".minigit").exists());
}

#[test]
fn logging_stays_off_stdout() {
    let dir = init_repository();
    fs::write(dir.path().join("a.txt"), "a").unwrap();

    minigit(dir.path())
        .args(["--debug", "add", "a.txt"])
        .assert()
        .success()
        .stdout("Added 'a.txt' to staging area.\n")
        .stderr(predicate::str::contains("Staged a.txt as a.txt"));
}

#[test]
fn extra_arguments_are_ignored() {
    let dir = init_repository();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("n.txt"), "n").unwrap();

    minigit(dir.path())
        .args(["add", "a.txt", "n.txt"])
        .assert()
        .success()
        .stdout("Added 'a.txt' to staging area.\n");

    minigit(dir.path())
        .args(["commit", "-fix typo", "--amend"])
        .assert()
        .success()
        .stdout("Committed: -fix typo\n");

    let log = read_log(dir.path());
    assert_eq!(log.records()[0].message, "-fix typo");
    assert_eq!(log.records()[0].files, vec!["a.txt"]);

    minigit(dir.path())
        .args(["log", "extra", "--oneline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message   : -fix typo"));

    minigit(dir.path())
        .args(["status", "-s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Untracked files ===\n  n.txt"));
}

#[test]
fn log_lists_newest_commit_first() {
    let dir = init_repository();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    minigit(dir.path()).args(["add", "a.txt"]).assert().success();
    minigit(dir.path()).args(["commit", "first"]).assert().success();

    // commit ids have second resolution
    thread::sleep(Duration::from_millis(1100));

    fs::write(dir.path().join("b.txt"), "b").unwrap();
    minigit(dir.path()).args(["add", "b.txt"]).assert().success();
    minigit(dir.path()).args(["commit", "second"]).assert().success();

    let output = minigit(dir.path()).arg("log").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let second = stdout.find("Commit 2: commit_").expect("second commit listed");
    let first = stdout.find("Commit 1: commit_").expect("first commit listed");
    assert!(second < first);
    assert!(stdout.find("Message   : second").unwrap() < stdout.find("Message   : first").unwrap());
    assert!(stdout.contains("Files     : b.txt"));
}

#[test]
fn corrupt_index_fails_with_error_on_stderr() {
    let dir = init_repository();
    fs::write(dir.path().join(".minigit").join("commits.json"), "{not json").unwrap();

    minigit(dir.path())
        .arg("log")
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Serialization error"));
}

#[test]
fn staging_area_files_cannot_be_added() {
    let dir = init_repository();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    minigit(dir.path()).args(["add", "a.txt"]).assert().success();

    minigit(dir.path())
        .args(["add", ".minigit/staging/a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("inside the repository directory"));

    assert_eq!(
        fs::read(dir.path().join(".minigit").join("staging").join("a.txt")).unwrap(),
        b"hello"
    );
}
