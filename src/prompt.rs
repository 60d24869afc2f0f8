//! Interactive choice prompts.
//!
//! A response line is trimmed, lowercased, and matched as a prefix
//! against the choice words. An empty line selects the default; `?`
//! re-asks; EOF cancels the whole run.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::errors::MvEditError;

/// Seam for user decisions so the pipeline can be driven from a terminal,
/// unattended, or by tests.
pub trait Prompter {
    /// Present `message` and return one of `choices` (the full word).
    ///
    /// `default` is selected by an empty response. `auto` is the answer an
    /// unattended run gives; callers pass the documented non-interactive
    /// resolution for each checkpoint (not always the interactive default:
    /// e.g. a collision defaults to "restart" at a terminal but must quit
    /// when nobody can re-edit).
    fn choose(
        &mut self,
        message: &str,
        choices: &[&'static str],
        default: Option<&'static str>,
        auto: &'static str,
    ) -> Result<&'static str>;
}

/// How one response line maps onto the choice set.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    Selected(&'static str),
    Retry,
}

pub(crate) fn resolve_response(
    response: &str,
    choices: &[&'static str],
    default: Option<&'static str>,
) -> Resolution {
    let trimmed = response.trim().to_lowercase();
    if trimmed.is_empty() {
        return match default {
            Some(d) => Resolution::Selected(d),
            None => Resolution::Retry,
        };
    }
    if trimmed == "?" {
        return Resolution::Retry;
    }

    let hits: Vec<&'static str> = choices
        .iter()
        .copied()
        .filter(|choice| choice.starts_with(&trimmed))
        .collect();
    match hits.as_slice() {
        [one] => Resolution::Selected(*one),
        [] => {
            eprintln!("Invalid choice: {}", response.trim());
            Resolution::Retry
        }
        _ => {
            eprintln!("Ambiguous choice: {}", response.trim());
            Resolution::Retry
        }
    }
}

/// Reads responses from standard input.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn choose(
        &mut self,
        message: &str,
        choices: &[&'static str],
        default: Option<&'static str>,
        _auto: &'static str,
    ) -> Result<&'static str> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("{message}");
            io::stdout().flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    // EOF: leave the prompt on its own line, then cancel.
                    println!();
                    return Err(MvEditError::Cancelled.into());
                }
            };
            if let Resolution::Selected(choice) = resolve_response(&line, choices, default) {
                return Ok(choice);
            }
        }
    }
}

/// Never prompts; answers every checkpoint with its unattended resolution.
pub struct AutoPrompter;

impl Prompter for AutoPrompter {
    fn choose(
        &mut self,
        _message: &str,
        choices: &[&'static str],
        _default: Option<&'static str>,
        auto: &'static str,
    ) -> Result<&'static str> {
        debug_assert!(choices.contains(&auto));
        Ok(auto)
    }
}

#[cfg(test)]
pub(crate) struct ScriptedPrompter {
    responses: std::collections::VecDeque<&'static str>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new(responses: &[&'static str]) -> Self {
        Self {
            responses: responses.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn choose(
        &mut self,
        _message: &str,
        choices: &[&'static str],
        default: Option<&'static str>,
        _auto: &'static str,
    ) -> Result<&'static str> {
        let response = self.responses.pop_front().expect("unexpected prompt");
        match resolve_response(response, choices, default) {
            Resolution::Selected(choice) => Ok(choice),
            Resolution::Retry => panic!("scripted response {response:?} did not resolve"),
        }
    }
}
