//! Interactive menus.
//!
//! The installer only asks two kinds of questions: pick one item, or pick any
//! number of items. [`UserPrompt`] abstracts them so the terminal UI can be
//! replaced, e.g. by [`PresetPrompt`] for unattended installs.
use std::collections::BTreeSet;

use crate::error::InstallerError;

/// Outcome of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    /// The user dismissed the menu.
    Cancelled,
    /// The user confirmed the menu with a value.
    Chosen(T),
}

impl<T> Choice<T> {
    /// Maps the chosen value.
    pub fn map<U, F>(self, func: F) -> Choice<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Choice::Cancelled => Choice::Cancelled,
            Choice::Chosen(value) => Choice::Chosen(func(value)),
        }
    }

    /// Returns whether the menu was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Choice::Cancelled)
    }
}

/// A source of user decisions.
///
/// Errors are reserved for failures of the prompt itself (such as a broken
/// terminal); the user backing out is reported as [`Choice::Cancelled`].
pub trait UserPrompt {
    /// Asks for exactly one of `items` and returns its index.
    fn select_one(&self, title: &str, items: &[String]) -> Result<Choice<usize>, InstallerError>;

    /// Asks for any subset of `items`, starting from the pre-checked
    /// `defaults`, and returns the indices chosen.
    fn select_many(
        &self,
        title: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Choice<BTreeSet<usize>>, InstallerError>;
}

/// Answers menus without user interaction.
///
/// Single-choice menus pick the item named by [`Self::with_item`] or, if none
/// was given, the first item. Multi-choice menus pick the defaults adjusted
/// by [`Self::with_override`].
#[derive(Debug, Clone, Default)]
pub struct PresetPrompt {
    item: Option<String>,
    overrides: Vec<(String, bool)>,
}

impl PresetPrompt {
    /// Creates a prompt that accepts all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the item with this label in single-choice menus.
    pub fn with_item<S: Into<String>>(mut self, label: S) -> Self {
        self.item = Some(label.into());
        self
    }

    /// Forces the item with this label on or off in multi-choice menus.
    pub fn with_override<S: Into<String>>(mut self, label: S, checked: bool) -> Self {
        self.overrides.push((label.into(), checked));
        self
    }
}

impl UserPrompt for PresetPrompt {
    fn select_one(&self, title: &str, items: &[String]) -> Result<Choice<usize>, InstallerError> {
        let index = match &self.item {
            Some(label) => items.iter().position(|item| item == label),
            None if items.is_empty() => None,
            None => Some(0),
        };

        tracing::info!(title, ?index, "preset single choice");

        Ok(match index {
            Some(index) => Choice::Chosen(index),
            None => Choice::Cancelled,
        })
    }

    fn select_many(
        &self,
        title: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Choice<BTreeSet<usize>>, InstallerError> {
        let chosen = items
            .iter()
            .enumerate()
            .filter(|(index, item)| {
                self.overrides
                    .iter()
                    .rev()
                    .find(|(label, _)| label == *item)
                    .map(|(_, checked)| *checked)
                    .unwrap_or_else(|| defaults.get(*index).copied().unwrap_or(false))
            })
            .map(|(index, _)| index)
            .collect();

        tracing::info!(title, ?chosen, "preset multiple choice");

        Ok(Choice::Chosen(chosen))
    }
}
