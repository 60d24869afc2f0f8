//! Launching the external text editor and parsing the edited listing.
//!
//! The listing is written to a temporary file behind an instruction
//! banner; after the editor exits, the path block is recovered as the
//! file-final contiguous block of lines, which keeps the parse robust to
//! a partially edited banner.

use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::errors::MvEditError;

const HORIZONTAL_RULE: &str =
    "**********************************************************************";

const INSTRUCTIONS: &[&str] = &[
    HORIZONTAL_RULE,
    "* INSTRUCTIONS:",
    "*",
    "* Edit file paths below to move or rename the corresponding files.",
    "*",
    "* Do NOT add or remove any lines.",
    "*",
    HORIZONTAL_RULE,
    "",
];

/// Seam over "hand the user a listing, get back the edited listing".
pub trait Editor {
    fn edit(&mut self, paths: &[String]) -> Result<Vec<String>>;
}

/// Launches a real editor subprocess on a temporary file.
pub struct CommandEditor {
    /// Explicit editor command line (`--editor`); falls back to
    /// `$VISUAL` / `$EDITOR` / platform defaults when `None`.
    command: Option<String>,
}

impl CommandEditor {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl Editor for CommandEditor {
    fn edit(&mut self, paths: &[String]) -> Result<Vec<String>> {
        let mut file = tempfile::Builder::new()
            .prefix("mvedit-")
            .suffix(".txt")
            .tempfile()
            .context("create temporary edit buffer")?;
        for line in INSTRUCTIONS {
            writeln!(file, "{line}")?;
        }
        for path in paths {
            writeln!(file, "{path}")?;
        }
        file.flush().context("flush temporary edit buffer")?;

        run_editor(
            file.path(),
            Some(INSTRUCTIONS.len() + 1),
            self.command.as_deref(),
        )?;

        // Re-read by path: some editors replace the file rather than
        // writing through the open handle.
        let content = fs::read_to_string(file.path()).context("read edited listing")?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        Ok(extract_file_paths(&lines))
    }
}

/// The file-final contiguous block of non-blank lines: trailing blank
/// lines are ignored, and everything up to the last blank line before the
/// block (the banner) is discarded.
pub fn extract_file_paths(lines: &[String]) -> Vec<String> {
    let last = match lines.iter().rposition(|l| !l.trim().is_empty()) {
        Some(i) => i,
        None => return Vec::new(),
    };
    let first = lines[..last]
        .iter()
        .rposition(|l| l.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(0);
    lines[first..=last]
        .iter()
        .map(|l| l.trim_end_matches(['\r', '\n']).to_string())
        .collect()
}

/// Open `file_path` in an editor, positioned at `line_number` when the
/// editor supports it.
pub fn run_editor(file_path: &Path, line_number: Option<usize>, editor: Option<&str>) -> Result<()> {
    let (program, mut options) = resolve_editor(editor)?;

    let mut file_arg = file_path.as_os_str().to_owned();
    if let Some(line) = line_number {
        let name = Path::new(&program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        match name {
            // These take "file:line" instead of "+line".
            "sublime_text" | "code" => {
                file_arg.push(format!(":{line}"));
            }
            "notepad.exe" | "notepad" => {}
            _ => options.push(format!("+{line}")),
        }
    }
    if cfg!(unix) && file_path.to_string_lossy().starts_with('-') {
        options.push("--".to_string());
    }

    debug!(editor = %program, ?options, "launching editor");
    let status = Command::new(&program)
        .args(&options)
        .arg(&file_arg)
        .status()
        .with_context(|| format!("failed to launch editor \"{program}\""))?;
    if !status.success() {
        return Err(MvEditError::EditorFailed { command: program }.into());
    }
    Ok(())
}

/// Editor resolution order: explicit command, `$VISUAL`, `$EDITOR`,
/// `/usr/bin/editor` if present, `vi` (Unix); `notepad.exe` (Windows).
/// The command string is shell-split so values like `"code -w"` work.
fn resolve_editor(explicit: Option<&str>) -> Result<(String, Vec<String>)> {
    let raw = explicit
        .map(str::to_owned)
        .or_else(|| env::var("VISUAL").ok().filter(|v| !v.trim().is_empty()))
        .or_else(|| env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()));

    if let Some(raw) = raw {
        let mut parts = shlex::split(&raw)
            .ok_or_else(|| anyhow!("editor command has unbalanced quoting: {raw}"))?;
        if parts.is_empty() {
            return Err(MvEditError::NoEditor.into());
        }
        let program = parts.remove(0);
        return Ok((program, parts));
    }

    if cfg!(windows) {
        return Ok(("notepad.exe".to_string(), Vec::new()));
    }
    let debian_default = Path::new("/usr/bin/editor");
    if debian_default.exists() {
        return Ok((debian_default.display().to_string(), Vec::new()));
    }
    Ok(("vi".to_string(), Vec::new()))
}
