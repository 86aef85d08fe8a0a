//! End-of-day summary text.

use super::types::Task;

/// Result of folding tasks and notes into a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing to report; callers show the "angry" feedback instead of text.
    Empty,
    Ready(String),
}

impl UpdateOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, UpdateOutcome::Empty)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            UpdateOutcome::Empty => None,
            UpdateOutcome::Ready(text) => Some(text),
        }
    }
}

pub fn generate_update(tasks: &[Task], notes: &str) -> UpdateOutcome {
    if tasks.is_empty() && notes.trim().is_empty() {
        return UpdateOutcome::Empty;
    }

    let completed = join_texts(tasks.iter().filter(|task| task.done));
    let pending = join_texts(tasks.iter().filter(|task| !task.done));

    UpdateOutcome::Ready(format!(
        "Today's accomplishments: {}. \nNotes: {}. \nPending tasks for tomorrow: {}.",
        completed, notes, pending
    ))
}

fn join_texts<'a>(tasks: impl Iterator<Item = &'a Task>) -> String {
    tasks
        .map(|task| task.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
