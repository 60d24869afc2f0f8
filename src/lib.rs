//! Core library for `mvedit`.
//!
//! Renames or moves files by letting the user edit a text listing of
//! their paths. The pipeline runs Normalizer -> Validator -> Scheduler ->
//! Executor: the validator diffs the edited listing into rename pairs and
//! rejects colliding edits, the scheduler orders pairs so rename chains
//! never trip over a still-occupied destination, and the executor applies
//! single atomic renames (staging rotations through temporary names)
//! while recording inverse actions for best-effort rollback.

pub mod app;
pub mod apply;
pub mod cli;
pub mod editor;
pub mod errors;
pub mod logging;
pub mod output;
pub mod paths;
pub mod plan;
pub mod prompt;
pub mod schedule;
pub mod shutdown;

pub use apply::{ApplyReport, Executor, MoveFailure};
pub use errors::MvEditError;
pub use plan::{RenamePair, Validation};
