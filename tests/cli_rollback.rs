#![cfg(unix)]

mod common;

use assert_cmd::cargo;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn unattended_failure_rolls_back_applied_steps() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "content-a").unwrap();
    fs::write(dir.path().join("b.txt"), "content-b").unwrap();
    // A regular file where the second destination needs a directory, so
    // the second move fails only at apply time.
    fs::write(dir.path().join("blocker"), "occupied").unwrap();

    let editor = common::fake_editor(dir.path());
    let replacement =
        common::write_replacement(dir.path(), &["moved/a.txt", "blocker/b.txt"]);

    let me = cargo::cargo_bin!("mvedit");
    let out = Command::new(me)
        .current_dir(dir.path())
        .env_remove("VISUAL")
        .env("EDITOR", &editor)
        .env("MVEDIT_REPLACEMENT", &replacement)
        .args(["--non-interactive", "--no-preview", "a.txt", "b.txt"])
        .output()
        .expect("spawn binary");

    assert!(!out.status.success(), "partial failure must exit non-zero");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to move"), "stderr: {stderr}");

    // The first move succeeded and was then undone, including the
    // directory it created; the failed pair was never applied.
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "content-a");
    assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "content-b");
    assert_eq!(fs::read_to_string(dir.path().join("blocker")).unwrap(), "occupied");
    assert!(!dir.path().join("moved").exists());
}

#[test]
fn successful_entries_survive_when_nothing_failed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "content-a").unwrap();
    fs::write(dir.path().join("b.txt"), "content-b").unwrap();

    let editor = common::fake_editor(dir.path());
    let replacement = common::write_replacement(dir.path(), &["one.txt", "two.txt"]);

    let me = cargo::cargo_bin!("mvedit");
    let out = Command::new(me)
        .current_dir(dir.path())
        .env_remove("VISUAL")
        .env("EDITOR", &editor)
        .env("MVEDIT_REPLACEMENT", &replacement)
        .args(["--non-interactive", "--no-preview", "a.txt", "b.txt"])
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(dir.path().join("one.txt")).unwrap(), "content-a");
    assert_eq!(fs::read_to_string(dir.path().join("two.txt")).unwrap(), "content-b");
}
