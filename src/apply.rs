//! Applying an execution queue to the filesystem.
//!
//! Every step is a single atomic rename; the executor pre-checks the
//! destination because `fs::rename` on Unix silently overwrites. A
//! destination that is still occupied by a pending source is a rotation:
//! the pair is staged through a temporary name, with the final hop pushed
//! to the back of the queue so the occupant moves away first. Everything
//! applied is mirrored on an undo stack for best-effort rollback.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::errors::MvEditError;
use crate::output as out;
use crate::paths;
use crate::plan::RenamePair;
use crate::prompt::Prompter;

/// Inverse of one applied step, replayed LIFO on rollback.
#[derive(Debug, PartialEq, Eq)]
enum UndoAction {
    /// Remove a directory this run created. Pushed before the move that
    /// needed it, so LIFO replay removes children before parents and
    /// only after the moved entry has been renamed back out.
    RemoveDir(PathBuf),
    /// Rename an applied destination back to its source.
    RenameBack {
        destination: PathBuf,
        source: PathBuf,
    },
}

impl UndoAction {
    fn revert(&self) -> io::Result<()> {
        match self {
            UndoAction::RemoveDir(dir) => fs::remove_dir(dir),
            UndoAction::RenameBack {
                destination,
                source,
            } => fs::rename(destination, source),
        }
    }
}

/// One abandoned pair and why it was abandoned.
#[derive(Debug)]
pub struct MoveFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub reason: String,
}

/// Generator for unused staging names, seeded fresh per plan application.
struct TempNamer {
    counter: u64,
}

impl TempNamer {
    fn new() -> Self {
        Self { counter: 0 }
    }

    /// An unused name in `dir`, scoped by pid so concurrent runs in the
    /// same directory cannot pick the same name.
    fn next(&mut self, dir: &Path) -> PathBuf {
        let pid = std::process::id();
        loop {
            self.counter += 1;
            let candidate = dir.join(format!(".mvedit-{pid}-{}.tmp", self.counter));
            if !paths::lexists(&candidate) {
                return candidate;
            }
        }
    }
}

/// What one plan application did to the filesystem.
#[derive(Debug)]
pub struct ApplyReport {
    undo: Vec<UndoAction>,
    pub failures: Vec<MoveFailure>,
}

impl ApplyReport {
    /// Number of moves that landed (staging hops included).
    pub fn applied(&self) -> usize {
        self.undo
            .iter()
            .filter(|action| matches!(action, UndoAction::RenameBack { .. }))
            .count()
    }
}

/// Drains an execution queue, best-effort: failures are recorded and the
/// remaining entries still run.
pub struct Executor {
    queue: VecDeque<RenamePair>,
    undo: Vec<UndoAction>,
    failures: Vec<MoveFailure>,
    namer: TempNamer,
}

impl Executor {
    pub fn new(queue: VecDeque<RenamePair>) -> Self {
        Self {
            queue,
            undo: Vec::new(),
            failures: Vec::new(),
            namer: TempNamer::new(),
        }
    }

    pub fn run(mut self) -> ApplyReport {
        while let Some(pair) = self.queue.pop_front() {
            self.apply_one(pair);
        }
        info!(
            applied = self.undo.len(),
            failed = self.failures.len(),
            "execution queue drained"
        );
        ApplyReport {
            undo: self.undo,
            failures: self.failures,
        }
    }

    fn apply_one(&mut self, pair: RenamePair) {
        if let Some(parent) = pair.destination.parent() {
            if let Err(e) = self.create_ancestors(parent) {
                self.fail(pair, format!("{e:#}"));
                return;
            }
        }

        if paths::lexists(&pair.destination) {
            if self.is_pending_source(&pair.destination) {
                self.defer(pair);
                return;
            }
            self.fail(pair, "destination already exists".to_string());
            return;
        }

        match fs::rename(&pair.source, &pair.destination) {
            Ok(()) => {
                let verb = if pair.source.parent() == pair.destination.parent() {
                    "Renamed"
                } else {
                    "Moved"
                };
                out::print_user(&format!(
                    "{verb}: \"{}\" => \"{}\"",
                    pair.source.display(),
                    pair.destination.display()
                ));
                self.undo.push(UndoAction::RenameBack {
                    destination: pair.destination,
                    source: pair.source,
                });
            }
            Err(e) => self.fail(pair, e.to_string()),
        }
    }

    /// True when `path` will be vacated by an entry still in the queue.
    fn is_pending_source(&self, path: &Path) -> bool {
        self.queue.iter().any(|pair| pair.source == *path)
    }

    /// Break a rotation: stage the source under a temporary name now
    /// (queue front) and land it once the destination has been vacated
    /// (queue back).
    fn defer(&mut self, pair: RenamePair) {
        let dir = pair
            .source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let temp = self.namer.next(&dir);
        debug!(
            source = %pair.source.display(),
            destination = %pair.destination.display(),
            temp = %temp.display(),
            "deferring rotation through temporary name"
        );
        self.queue
            .push_front(RenamePair::new(pair.source, temp.clone()));
        self.queue.push_back(RenamePair::new(temp, pair.destination));
    }

    /// Create missing ancestors of `dir`, outermost first, recording one
    /// removal undo action per directory actually created.
    fn create_ancestors(&mut self, dir: &Path) -> Result<()> {
        if dir.as_os_str().is_empty() {
            return Ok(());
        }
        let mut missing = Vec::new();
        let mut cursor = dir;
        while !paths::lexists(cursor) {
            missing.push(cursor.to_path_buf());
            match cursor.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => cursor = parent,
                _ => break,
            }
        }
        for created in missing.iter().rev() {
            fs::create_dir(created)
                .with_context(|| format!("create directory \"{}\"", created.display()))?;
            self.undo.push(UndoAction::RemoveDir(created.clone()));
        }
        Ok(())
    }

    fn fail(&mut self, pair: RenamePair, reason: String) {
        warn!(
            source = %pair.source.display(),
            destination = %pair.destination.display(),
            %reason,
            "move abandoned"
        );
        self.failures.push(MoveFailure {
            source: pair.source,
            destination: pair.destination,
            reason,
        });
    }
}

/// Report failures and, when anything was applied, decide whether to roll
/// back. Interactive default is to keep the partial result; unattended
/// runs undo automatically.
pub fn finish(report: ApplyReport, prompter: &mut dyn Prompter) -> Result<()> {
    if report.failures.is_empty() {
        return Ok(());
    }

    for failure in &report.failures {
        out::print_error(&format!(
            "Failed to move \"{}\" to \"{}\": {}",
            failure.source.display(),
            failure.destination.display(),
            failure.reason
        ));
    }

    if !report.undo.is_empty() {
        let choice = prompter.choose(
            "k: Keep successful changes (default)\nu: Undo all changes\n? [k] ",
            &["keep", "undo"],
            Some("keep"),
            "undo",
        )?;
        if choice == "undo" {
            rollback(report.undo)?;
        }
    }

    bail!("failed to move {} entries", report.failures.len());
}

/// Strict LIFO replay of the undo stack. A failed action is reported and
/// replay continues; any failure turns the run into the distinguished
/// "failed to undo" condition.
fn rollback(mut undo: Vec<UndoAction>) -> Result<()> {
    let mut undo_failed = false;
    while let Some(action) = undo.pop() {
        if let Err(e) = action.revert() {
            match &action {
                UndoAction::RemoveDir(dir) => out::print_error(&format!(
                    "Failed to remove \"{}\": {e}",
                    dir.display()
                )),
                UndoAction::RenameBack {
                    destination,
                    source,
                } => out::print_error(&format!(
                    "Failed to rename \"{}\" back to \"{}\": {e}",
                    destination.display(),
                    source.display()
                )),
            }
            undo_failed = true;
        }
    }
    if undo_failed {
        return Err(MvEditError::UndoFailed.into());
    }
    Ok(())
}
