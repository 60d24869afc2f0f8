//! Application orchestrator.
//! Initializes logging, installs the signal handler, gathers the input
//! listing, and drives the edit / validate / schedule / apply pipeline
//! with an outer restart loop.

use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{Result, bail};
use tracing::debug;

use crate::apply;
use crate::cli::Args;
use crate::editor::{CommandEditor, Editor};
use crate::errors::MvEditError;
use crate::logging;
use crate::output as out;
use crate::paths::{self, NormalizeOptions};
use crate::plan::{self, PlanContext, RenamePair, Validation};
use crate::prompt::{AutoPrompter, Prompter, StdinPrompter};
use crate::schedule;
use crate::shutdown;

#[derive(Debug, Clone, Default)]
pub struct EditMoveOptions {
    pub normalize: NormalizeOptions,
    /// Skip the confirmation preview before applying.
    pub no_preview: bool,
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    let guard = logging::init_tracing(args.effective_log_level(), args.log_file.as_deref())?;

    ctrlc::set_handler(|| {
        shutdown::request();
        eprintln!();
    })
    .expect("failed to install signal handler");

    let from_stdin = args.paths.len() == 1 && args.paths[0] == "-";
    let raw = if from_stdin {
        read_stdin_paths()?
    } else {
        args.paths.clone()
    };
    if raw.is_empty() {
        bail!("no paths given");
    }

    let opts = EditMoveOptions {
        normalize: NormalizeOptions {
            absolute: args.absolute,
            keep_order: args.keep_order,
        },
        no_preview: args.no_preview,
    };

    let mut editor = CommandEditor::new(args.editor.clone());
    // Paths on stdin leave no terminal to answer prompts with; fall back
    // to the unattended defaults.
    let mut prompter: Box<dyn Prompter> = if args.non_interactive || from_stdin {
        Box::new(AutoPrompter)
    } else {
        Box::new(StdinPrompter)
    };

    let result = edit_move(&raw, &mut editor, prompter.as_mut(), &opts);
    drop(guard);
    result
}

fn read_stdin_paths() -> Result<Vec<String>> {
    let lines: Vec<String> = io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<Vec<_>>>()?;
    Ok(lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect())
}

/// The whole pipeline for one invocation: normalize, then loop
/// edit -> validate -> preview until the plan proceeds, restarts, or the
/// run aborts; finally schedule and apply.
pub fn edit_move(
    raw_paths: &[String],
    editor: &mut dyn Editor,
    prompter: &mut dyn Prompter,
    opts: &EditMoveOptions,
) -> Result<()> {
    let original_paths = paths::normalize_input_paths(raw_paths, &opts.normalize)?;

    // The listing handed to the editor must be line-safe; the original
    // (unsanitized) paths stay the pair sources.
    let sanitized: Vec<String> = original_paths.iter().map(|p| paths::sanitized(p)).collect();
    if sanitized != original_paths {
        out::print_warn("Non-printable characters found in paths.");
        match prompter.choose(
            "r: Replace non-printable characters (default)\nq: Quit\n? [r] ",
            &["replace", "quit"],
            Some("replace"),
            "replace",
        )? {
            "replace" => {}
            _ => return Err(MvEditError::Cancelled.into()),
        }
    }

    let mut paths_to_edit = sanitized;
    loop {
        debug_assert_eq!(paths_to_edit.len(), original_paths.len());
        let previous = paths_to_edit.clone();
        let edited = editor.edit(&paths_to_edit)?;
        let new_paths: Vec<String> = edited
            .iter()
            .map(|line| {
                paths::normalize_lexically(Path::new(line))
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        let ctx = PlanContext {
            original_paths: &original_paths,
            previous_paths: &previous,
        };
        let (pairs, edited) = match plan::validate(&ctx, new_paths, prompter)? {
            Validation::Restart(seed) => {
                paths_to_edit = seed;
                continue;
            }
            Validation::Proceed { plan, edited } => (plan, edited),
        };

        if !opts.no_preview && !preview(&pairs, prompter)? {
            paths_to_edit = edited;
            continue;
        }

        if shutdown::is_requested() {
            return Err(MvEditError::Cancelled.into());
        }

        debug!(pairs = pairs.len(), "applying rename plan");
        let queue = schedule::build_queue(pairs);
        let report = apply::Executor::new(queue).run();
        return apply::finish(report, prompter);
    }
}

/// Show the pending moves and confirm. `false` means "edit again".
fn preview(pairs: &[RenamePair], prompter: &mut dyn Prompter) -> Result<bool> {
    out::print_user("The following files will be moved or renamed:");
    for pair in pairs {
        out::print_user(&format!(
            "  \"{}\" => \"{}\"",
            pair.source.display(),
            pair.destination.display()
        ));
    }
    match prompter.choose(
        "p: Proceed (default)\ne: Edit\nq: Quit\n? [p] ",
        &["proceed", "edit", "quit"],
        Some("proceed"),
        "proceed",
    )? {
        "proceed" => Ok(true),
        "edit" => Ok(false),
        _ => Err(MvEditError::Cancelled.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    /// Editor stub that returns scripted listings, one per invocation.
    struct ScriptedEditor {
        rounds: std::collections::VecDeque<Vec<String>>,
    }

    impl ScriptedEditor {
        fn new(rounds: Vec<Vec<String>>) -> Self {
            Self {
                rounds: rounds.into_iter().collect(),
            }
        }
    }

    impl Editor for ScriptedEditor {
        fn edit(&mut self, _paths: &[String]) -> Result<Vec<String>> {
            Ok(self.rounds.pop_front().expect("unexpected editor round"))
        }
    }

    fn opts() -> EditMoveOptions {
        EditMoveOptions {
            no_preview: true,
            ..Default::default()
        }
    }

    #[test]
    fn end_to_end_rename() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        let src = dir.path().join("a.txt").display().to_string();
        let dst = dir.path().join("b.txt").display().to_string();

        let mut editor = ScriptedEditor::new(vec![vec![dst.clone()]]);
        let mut prompter = ScriptedPrompter::new(&[]);
        edit_move(&[src], &mut editor, &mut prompter, &opts()).unwrap();

        dir.child("b.txt").assert("a");
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn restart_round_reinvokes_editor() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("x.txt").write_str("x").unwrap();
        let raw = [
            dir.path().join("a.txt").display().to_string(),
            dir.path().join("x.txt").display().to_string(),
        ];

        // First round removes a line (count mismatch -> restart), second
        // round is sound.
        let mut editor = ScriptedEditor::new(vec![
            vec![dir.path().join("only-one-line").display().to_string()],
            vec![
                dir.path().join("b.txt").display().to_string(),
                dir.path().join("x.txt").display().to_string(),
            ],
        ]);
        let mut prompter = ScriptedPrompter::new(&["r"]);
        edit_move(&raw, &mut editor, &mut prompter, &opts()).unwrap();
        dir.child("b.txt").assert("a");
    }

    #[test]
    fn preview_quit_cancels_without_touching_files() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        let src = dir.path().join("a.txt").display().to_string();
        let dst = dir.path().join("b.txt").display().to_string();

        let mut editor = ScriptedEditor::new(vec![vec![dst]]);
        let mut prompter = ScriptedPrompter::new(&["q"]);
        let with_preview = EditMoveOptions::default();
        let err = edit_move(&[src], &mut editor, &mut prompter, &with_preview).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MvEditError>(),
            Some(MvEditError::Cancelled)
        ));
        dir.child("a.txt").assert("a");
    }
}
