//! Input path normalization and validation.
//!
//! Turns the raw argument list into the canonical listing presented in the
//! editor: normalized, deduplicated, optionally sorted, and verified to be
//! movable (every entry exists; no entry is an ancestor directory of
//! another entry in the same list).

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::errors::MvEditError;

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Present absolute paths in the editor.
    pub absolute: bool,
    /// Keep the input order instead of sorting.
    pub keep_order: bool,
}

/// `lstat`-style existence: a dangling symlink counts as existing.
pub fn lexists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Lexical normalization: drop `.` components and fold `..` into a
/// preceding normal component. Does not touch the filesystem, so a `..`
/// across a symlink is folded textually, same as the listing the user
/// sees and edits.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(comp),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    let mut out = PathBuf::new();
    for part in parts {
        out.push(part.as_os_str());
    }
    out
}

/// Absolute form of `path` without resolving symlinks.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("cannot determine the current directory")?
            .join(path)
    };
    let normalized = normalize_lexically(&joined);
    Ok(dunce::simplified(&normalized).to_path_buf())
}

/// Replace CR/LF with a space and drop all other control characters.
/// Control characters would corrupt the line-oriented edit buffer.
pub fn sanitized(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\r' | '\n' => Some(' '),
            c if (c as u32) < 0x20 => None,
            c => Some(c),
        })
        .collect()
}

/// Normalize, deduplicate, optionally sort, and validate the raw input
/// paths. Fatal on a missing entry or on a directory being moved together
/// with something inside it.
pub fn normalize_input_paths(raw: &[String], opts: &NormalizeOptions) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::with_capacity(raw.len());
    for entry in raw {
        let normalized = if opts.absolute {
            absolutize(Path::new(entry))?
        } else {
            normalize_lexically(Path::new(entry))
        };
        let text = normalized.to_string_lossy().into_owned();
        if seen.insert(text.clone()) {
            paths.push(text);
        }
    }
    if !opts.keep_order {
        paths.sort();
    }
    verify_movable(&paths)?;
    debug!(count = paths.len(), "normalized input listing");
    Ok(paths)
}

/// Every entry must exist, and no entry may live under a directory that is
/// itself being moved: the directory move would invalidate the inner
/// entry's path mid-plan.
fn verify_movable(paths: &[String]) -> Result<()> {
    let mut absolute = Vec::with_capacity(paths.len());
    let mut directories = HashSet::new();
    for path in paths {
        let abs = absolutize(Path::new(path))?;
        if abs.is_dir() {
            directories.insert(abs.clone());
        } else if !lexists(&abs) {
            return Err(MvEditError::SourceNotFound(PathBuf::from(path)).into());
        }
        absolute.push(abs);
    }

    for (path, abs) in paths.iter().zip(&absolute) {
        for ancestor in abs.ancestors().skip(1) {
            if directories.contains(ancestor) {
                return Err(MvEditError::MoveTogether {
                    path: PathBuf::from(path),
                    ancestor: ancestor.to_path_buf(),
                }
                .into());
            }
        }
    }
    Ok(())
}
