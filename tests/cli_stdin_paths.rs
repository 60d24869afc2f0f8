#![cfg(unix)]

mod common;

use assert_cmd::cargo;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::tempdir;

#[test]
fn dash_reads_listing_from_stdin() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "content-a").unwrap();
    fs::write(dir.path().join("b.txt"), "content-b").unwrap();

    let editor = common::fake_editor(dir.path());
    let replacement = common::write_replacement(dir.path(), &["one.txt", "two.txt"]);

    let me = cargo::cargo_bin!("mvedit");
    let mut child = Command::new(me)
        .current_dir(dir.path())
        .env_remove("VISUAL")
        .env("EDITOR", &editor)
        .env("MVEDIT_REPLACEMENT", &replacement)
        .args(["--no-preview", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn binary");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"a.txt\nb.txt\n\n")
        .unwrap();
    let out = child.wait_with_output().expect("wait for binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(dir.path().join("one.txt")).unwrap(), "content-a");
    assert_eq!(fs::read_to_string(dir.path().join("two.txt")).unwrap(), "content-b");
}

#[test]
fn explicit_editor_flag_overrides_environment() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "content-a").unwrap();

    let editor = common::fake_editor(dir.path());
    let replacement = common::write_replacement(dir.path(), &["renamed.txt"]);

    let me = cargo::cargo_bin!("mvedit");
    let out = Command::new(me)
        .current_dir(dir.path())
        .env_remove("VISUAL")
        // Environment points at a broken editor; the flag must win.
        .env("EDITOR", "/bin/false")
        .env("MVEDIT_REPLACEMENT", &replacement)
        .args([
            "--non-interactive",
            "--no-preview",
            "--editor",
            editor.to_str().unwrap(),
            "a.txt",
        ])
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read_to_string(dir.path().join("renamed.txt")).unwrap(),
        "content-a"
    );
}
