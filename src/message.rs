use crate::core::filter::FilterKind;
use crate::core::tracker::TrackerConfig;
use crate::sync::github::RemoteIssue;

#[derive(Debug, Clone)]
pub enum Message {
    // Task CRUD
    /// Text is stored trimmed; blank input adds nothing.
    AddTask(String),
    ToggleTaskDone(String),
    DeleteTask(String),
    ToggleTaskExpand(String),

    // Subtasks
    AddSubtask(String, String),
    ToggleSubtaskDone(String, String),
    DeleteSubtask(String, String),
    GenerateSubtasks(String),
    SubtasksGenerated(String, Vec<String>),

    // GitHub
    SyncGithub,
    IssuesFetched(Vec<RemoteIssue>),
    SaveTrackerConfig(TrackerConfig),
    DisconnectTracker,

    // View
    SetFilter(FilterKind),
    SearchQueryChanged(String),
}
