//! Plan validation: diffing the edited listing against the original and
//! rejecting structurally broken or colliding edits.
//!
//! Collision detection runs in two passes with different severities. Two
//! pairs sharing a destination can never both succeed, so duplicates
//! always force a restart or an abort. A destination that merely exists
//! on disk is fine when it is itself a pending source: that entry will
//! vacate its slot, forming a rename chain.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::errors::MvEditError;
use crate::output as out;
use crate::paths;
use crate::prompt::Prompter;

/// One requested move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl RenamePair {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Outcome of validating one round of edits.
#[derive(Debug)]
pub enum Validation {
    /// Edits are sound; apply this plan. `edited` is kept so a later
    /// checkpoint (the preview) can seed another editing round.
    Proceed {
        plan: Vec<RenamePair>,
        edited: Vec<String>,
    },
    /// User chose to edit again, seeded with these paths.
    Restart(Vec<String>),
}

/// Inputs that stay fixed across editing rounds.
pub struct PlanContext<'a> {
    /// The normalized original listing; pair sources come from here.
    pub original_paths: &'a [String],
    /// The listing shown in the round that produced `new_paths`; count
    /// mismatches and duplicate collisions restart from it.
    pub previous_paths: &'a [String],
}

/// Validate one round of edited paths into a rename plan.
pub fn validate(
    ctx: &PlanContext<'_>,
    mut new_paths: Vec<String>,
    prompter: &mut dyn Prompter,
) -> Result<Validation> {
    if new_paths.is_empty() {
        return Err(MvEditError::EmptyEditList.into());
    }

    if new_paths.len() != ctx.original_paths.len() {
        out::print_warn("Lines added or removed.");
        return match prompter.choose(
            "r: Restart (default)\nq: Quit\n? [r] ",
            &["restart", "quit"],
            Some("restart"),
            // Unattended, re-running the editor cannot converge.
            "quit",
        )? {
            "restart" => Ok(Validation::Restart(ctx.previous_paths.to_vec())),
            _ => Err(MvEditError::Cancelled.into()),
        };
    }

    if new_paths.iter().any(|p| p.ends_with(char::is_whitespace)) {
        out::print_warn("Lines with trailing whitespace detected.");
        match prompter.choose(
            "s: Strip trailing whitespace (default)\np: Preserve all whitespace\ne: Edit\nq: Quit\n? [s] ",
            &["strip", "preserve", "edit", "quit"],
            Some("strip"),
            "strip",
        )? {
            "strip" => {
                for path in &mut new_paths {
                    *path = path.trim_end().to_string();
                }
            }
            "preserve" => {}
            "edit" => return Ok(Validation::Restart(new_paths)),
            _ => return Err(MvEditError::Cancelled.into()),
        }
    }

    // Unchanged lines are dropped; only actual moves form the plan.
    let plan: Vec<RenamePair> = ctx
        .original_paths
        .iter()
        .zip(&new_paths)
        .filter(|(original, new)| original != new)
        .map(|(original, new)| RenamePair::new(original, new))
        .collect();

    if plan.is_empty() {
        out::print_warn("Nothing to do.");
        return Err(MvEditError::Cancelled.into());
    }

    if let Some(validation) = check_collisions(ctx, &plan, &new_paths, prompter)? {
        return Ok(validation);
    }

    debug!(pairs = plan.len(), "validated rename plan");
    Ok(Validation::Proceed { plan, edited: new_paths })
}

/// Both collision passes. Returns a `Restart` when the user (or the
/// unattended policy) backs out; `None` means the plan is clean.
fn check_collisions(
    ctx: &PlanContext<'_>,
    plan: &[RenamePair],
    new_paths: &[String],
    prompter: &mut dyn Prompter,
) -> Result<Option<Validation>> {
    // Pass 1: one filesystem slot cannot receive two occupants.
    let mut destinations = HashSet::new();
    let mut duplicate = false;
    for pair in plan {
        if !destinations.insert(&pair.destination) {
            duplicate = true;
            out::print_error(&format!(
                "\"{}\" already used as a destination.",
                pair.destination.display()
            ));
        }
    }
    if duplicate {
        return match prompter.choose(
            "r: Restart (default)\nq: Quit\n? [r] ",
            &["restart", "quit"],
            Some("restart"),
            "quit",
        )? {
            "restart" => Ok(Some(Validation::Restart(ctx.previous_paths.to_vec()))),
            _ => Err(MvEditError::Cancelled.into()),
        };
    }

    // Pass 2: a pre-existing destination is only a collision when it is
    // not itself moving away (i.e. not a pending source).
    let sources: HashSet<&PathBuf> = plan.iter().map(|pair| &pair.source).collect();
    let mut occupied = false;
    for pair in plan {
        if paths::lexists(&pair.destination) && !sources.contains(&pair.destination) {
            occupied = true;
            out::print_warn(&format!("\"{}\" already exists.", pair.destination.display()));
        }
    }
    if occupied {
        return match prompter.choose(
            "e: Edit (default)\nq: Quit\n? [e] ",
            &["edit", "quit"],
            Some("edit"),
            "quit",
        )? {
            "edit" => Ok(Some(Validation::Restart(new_paths.to_vec()))),
            _ => Err(MvEditError::Cancelled.into()),
        };
    }

    Ok(None)
}
