//! Typed error definitions for mvedit.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MvEditError {
    #[error("\"{0}\" not found.")]
    SourceNotFound(PathBuf),

    #[error("\"{path}\" and \"{ancestor}\" cannot be moved together.")]
    MoveTogether { path: PathBuf, ancestor: PathBuf },

    #[error("Cancelling due to an empty file list.")]
    EmptyEditList,

    #[error("Editor exited with an error: {command}")]
    EditorFailed { command: String },

    #[error("Unable to determine what text editor to use. Set the EDITOR environment variable.")]
    NoEditor,

    #[error("Failed to undo changes.")]
    UndoFailed,

    /// User cancellation (explicit quit, or EOF at a prompt). Exits
    /// non-zero but prints no error line.
    #[error("Cancelled.")]
    Cancelled,
}

impl MvEditError {
    /// True for the distinguished quiet abort.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MvEditError::Cancelled)
    }
}
