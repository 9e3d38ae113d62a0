use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag applied to tasks imported from the issue tracker.
pub const GITHUB_TAG: &str = "github";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            completed: false,
            created_at: now_millis(),
            subtasks: Vec::new(),
            github_issue_number: None,
            github_url: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    /// Rounded percentage of completed subtasks; 0 when there are none.
    pub fn progress(&self) -> u8 {
        if self.subtasks.is_empty() {
            return 0;
        }
        let ratio = self.completed_subtasks() as f64 / self.subtasks.len() as f64;
        (ratio * 100.0).round() as u8
    }

    /// Append one subtask per text, skipping blank entries. Returns how many were added.
    pub fn append_subtasks<I, S>(&mut self, texts: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.subtasks.len();
        self.subtasks.extend(
            texts
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty())
                .map(Subtask::new),
        );
        self.subtasks.len() - before
    }

    pub fn toggle_subtask(&mut self, subtask_id: &str) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.completed = !subtask.completed;
                true
            }
            None => false,
        }
    }

    pub fn remove_subtask(&mut self, subtask_id: &str) -> Option<Subtask> {
        let pos = self.subtasks.iter().position(|s| s.id == subtask_id)?;
        Some(self.subtasks.remove(pos))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no {kind} matches '{prefix}'")]
    NotFound { kind: &'static str, prefix: String },
    #[error("'{prefix}' matches {count} {kind}s, use a longer prefix")]
    Ambiguous {
        kind: &'static str,
        prefix: String,
        count: usize,
    },
}

/// Resolve an id or unique id prefix. An exact match always wins.
pub fn resolve_prefix<'a, T>(
    items: &'a [T],
    prefix: &str,
    kind: &'static str,
    id_of: impl Fn(&T) -> &str,
) -> Result<&'a T, LookupError> {
    let prefix = prefix.trim();
    if let Some(exact) = items.iter().find(|item| id_of(item) == prefix) {
        return Ok(exact);
    }

    let matches: Vec<&T> = if prefix.is_empty() {
        Vec::new()
    } else {
        items
            .iter()
            .filter(|item| id_of(item).starts_with(prefix))
            .collect()
    };

    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(LookupError::NotFound {
            kind,
            prefix: prefix.to_string(),
        }),
        many => Err(LookupError::Ambiguous {
            kind,
            prefix: prefix.to_string(),
            count: many.len(),
        }),
    }
}
