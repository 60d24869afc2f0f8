//! Shared helpers for driving the binary with a scripted editor.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write an executable shell script usable as $EDITOR that replaces the
/// edit buffer with the contents of the file named by $MVEDIT_REPLACEMENT.
#[cfg(unix)]
pub fn fake_editor(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let script = dir.join("fake-editor.sh");
    fs::write(
        &script,
        "#!/bin/sh\nfor last in \"$@\"; do :; done\ncp \"$MVEDIT_REPLACEMENT\" \"$last\"\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// An $EDITOR that exits without touching the buffer.
#[cfg(unix)]
pub fn noop_editor(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let script = dir.join("noop-editor.sh");
    fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// The listing the fake editor will substitute for the buffer.
pub fn write_replacement(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("replacement.txt");
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}
