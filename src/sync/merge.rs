use std::collections::HashSet;

use super::github::RemoteIssue;
use crate::core::task::{GITHUB_TAG, Task};

/// Build local tasks for fetched issues that are not yet mirrored.
///
/// Issues are matched by number only. Existing tasks are never touched, so
/// the caller prepends the result to its collection. Completion state is
/// copied once at import and never reconciled afterwards.
pub fn import_issues(existing: &[Task], issues: &[RemoteIssue], now_ms: i64) -> Vec<Task> {
    let mut known: HashSet<u64> = existing
        .iter()
        .filter_map(|t| t.github_issue_number)
        .collect();

    let mut imported = Vec::new();
    for issue in issues {
        // `insert` also guards against the same number twice in one batch
        if !known.insert(issue.number) {
            continue;
        }
        log::info!("Importing issue #{}: {}", issue.number, issue.title);
        imported.push(task_from_issue(issue, now_ms));
    }
    imported
}

fn task_from_issue(issue: &RemoteIssue, now_ms: i64) -> Task {
    let mut task = Task::new(issue.title.clone());
    task.completed = issue.is_closed();
    task.created_at = now_ms;
    task.github_issue_number = Some(issue.number);
    task.github_url = Some(issue.url.clone());
    task.tags.insert(GITHUB_TAG.to_string());
    task
}

/// Prepend the new tasks, in the order received, ahead of the existing collection.
pub fn apply_import(tasks: &mut Vec<Task>, imported: Vec<Task>) {
    if imported.is_empty() {
        return;
    }
    let existing = std::mem::take(tasks);
    *tasks = imported;
    tasks.extend(existing);
}
