use taskflow::core::task::{Subtask, Task};

const ID_WIDTH: usize = 8;

pub fn short_id(id: &str) -> String {
    id.chars().take(ID_WIDTH).collect()
}

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// One task line, plus its subtask checklist when expanded.
pub fn task_row(task: &Task, expanded: bool) -> String {
    let mut line = format!(
        "{:<width$}  {} {}",
        short_id(&task.id),
        checkbox(task.completed),
        task.text,
        width = ID_WIDTH
    );

    if let Some(number) = task.github_issue_number {
        line.push_str(&format!("  #{}", number));
    }
    for tag in &task.tags {
        line.push_str(&format!("  [{}]", tag));
    }
    if !task.subtasks.is_empty() {
        line.push_str(&format!(
            "  {}/{} subtasks ({}%)",
            task.completed_subtasks(),
            task.subtasks.len(),
            task.progress()
        ));
    }
    line.push('\n');

    if expanded {
        if let Some(url) = &task.github_url {
            line.push_str(&format!("{:indent$}{}\n", "", url, indent = ID_WIDTH + 6));
        }
        if task.subtasks.is_empty() {
            line.push_str(&format!(
                "{:indent$}No subtasks yet. Try `taskflow generate {}`.\n",
                "",
                short_id(&task.id),
                indent = ID_WIDTH + 6
            ));
        }
        for subtask in &task.subtasks {
            line.push_str(&subtask_row(subtask));
        }
    }

    line
}

fn subtask_row(subtask: &Subtask) -> String {
    format!(
        "{:indent$}{} {}  ({})\n",
        "",
        checkbox(subtask.completed),
        subtask.text,
        short_id(&subtask.id),
        indent = ID_WIDTH + 6
    )
}
