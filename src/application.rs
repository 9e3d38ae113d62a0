use std::path::PathBuf;

use crate::config::AppConfig;
use crate::core::filter::{self, FilterKind, Stats};
use crate::core::task::{LookupError, Subtask, Task, resolve_prefix};
use crate::core::tracker::TrackerConfig;
use crate::message::Message;
use crate::store::{LocalStore, ViewState};
use crate::sync::anthropic::SubtaskSuggester;
use crate::sync::github::GithubClient;
use crate::sync::merge;
use crate::sync::{ConnectionStatus, SyncError, SyncStatus};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("cannot open data directory {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Client(#[from] SyncError),
}

pub const SYNC_FAILED_ALERT: &str =
    "Failed to sync with GitHub. Please check your token permissions.";

/// Owns the task collection and tracker connection. Every mutation goes
/// through [`Application::update`] and is persisted before it returns.
pub struct Application {
    store: LocalStore,
    github: GithubClient,
    suggester: SubtaskSuggester,

    tasks: Vec<Task>,
    tracker: Option<TrackerConfig>,

    view: ViewState,
    filter: FilterKind,
    search_query: String,

    sync_status: SyncStatus,
    connection_status: ConnectionStatus,
}

impl Application {
    pub fn new(store: LocalStore, github: GithubClient, suggester: SubtaskSuggester) -> Self {
        let tasks = store.load_tasks();
        let tracker = store.load_tracker();
        let view = store.load_view_state();
        log::debug!(
            "Loaded {} tasks from {} (tracker: {})",
            tasks.len(),
            store.dir().display(),
            tracker.as_ref().map(|t| t.slug()).unwrap_or_else(|| "none".to_string())
        );

        Self {
            store,
            github,
            suggester,
            tasks,
            tracker,
            view,
            filter: FilterKind::default(),
            search_query: String::new(),
            sync_status: SyncStatus::default(),
            connection_status: ConnectionStatus::default(),
        }
    }

    /// Wire up clients and the store from config.
    pub fn from_config(config: &AppConfig, api_key: Option<String>) -> Result<Self, StartupError> {
        let store =
            LocalStore::open(&config.data_directory).map_err(|source| StartupError::DataDir {
                path: config.data_directory.clone(),
                source,
            })?;
        let github = GithubClient::new(&config.github_api_base)?;
        let suggester =
            SubtaskSuggester::new(api_key, &config.anthropic_api_base, &config.ai_model);
        Ok(Self::new(store, github, suggester))
    }

    pub async fn update(&mut self, message: Message) {
        match message {
            Message::AddTask(text) => {
                // Stored trimmed, not as typed.
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                let mut task = Task::new(text);

                if let Some(config) = self.tracker.clone() {
                    match self.github.create_issue(&task, &config).await {
                        Ok(issue) => {
                            task.github_issue_number = Some(issue.number);
                            task.github_url = Some(issue.url);
                        }
                        Err(e) => {
                            // Fall back to a local-only task
                            log::error!("Failed to create GitHub issue: {}", e);
                        }
                    }
                }

                log::info!("Added task: {}", task.text);
                self.tasks.insert(0, task);
                self.save_tasks();
            }

            Message::GenerateSubtasks(id) => {
                let Some(task) = self.tasks.iter().find(|t| t.id == id) else {
                    log::warn!("Generate subtasks: no task {}", id);
                    return;
                };
                if task.completed {
                    log::info!("Skipping subtask generation for completed task: {}", task.text);
                    return;
                }
                let text = task.text.clone();

                self.view.expanded.insert(id.clone());
                self.save_view_state();

                let suggestions = self.suggester.suggest_subtasks(&text).await;
                self.apply(Message::SubtasksGenerated(id, suggestions));
            }

            Message::SyncGithub => {
                let Some(config) = self.tracker.clone() else {
                    log::info!("Sync requested without a GitHub connection");
                    return;
                };

                match self.github.list_open_issues(&config).await {
                    Ok(issues) => self.apply(Message::IssuesFetched(issues)),
                    Err(e) => {
                        log::error!("Sync failed: {}", e);
                        self.sync_status = SyncStatus::Error(SYNC_FAILED_ALERT.to_string());
                    }
                }
            }

            Message::SaveTrackerConfig(config) => {
                if let Err(e) = config.ensure_complete() {
                    log::warn!("Rejected GitHub settings: {}", e);
                    self.connection_status = ConnectionStatus::Failed;
                    return;
                }
                if self.github.validate_token(&config.token).await {
                    log::info!("Connected to GitHub repository {}", config.slug());
                    if let Err(e) = self.store.save_tracker(&config) {
                        log::error!("Failed to save tracker config: {}", e);
                    }
                    self.tracker = Some(config);
                    self.connection_status = ConnectionStatus::Connected;
                } else {
                    self.connection_status = ConnectionStatus::Failed;
                }
            }

            other => self.apply(other),
        }
    }

    /// State transitions that need no network round trip.
    fn apply(&mut self, message: Message) {
        match message {
            Message::ToggleTaskDone(id) => {
                self.modify_task(&id, |task| task.toggle());
            }

            Message::DeleteTask(id) => {
                let before = self.tasks.len();
                self.tasks.retain(|t| t.id != id);
                if self.tasks.len() != before {
                    self.save_tasks();
                    if self.view.expanded.remove(&id) {
                        self.save_view_state();
                    }
                }
            }

            Message::ToggleTaskExpand(id) => {
                if !self.tasks.iter().any(|t| t.id == id) {
                    return;
                }
                if !self.view.expanded.remove(&id) {
                    self.view.expanded.insert(id);
                }
                self.save_view_state();
            }

            Message::AddSubtask(id, text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return;
                }
                self.modify_task(&id, |task| task.subtasks.push(Subtask::new(text)));
            }

            Message::ToggleSubtaskDone(id, subtask_id) => {
                self.modify_task(&id, |task| {
                    task.toggle_subtask(&subtask_id);
                });
            }

            Message::DeleteSubtask(id, subtask_id) => {
                self.modify_task(&id, |task| {
                    task.remove_subtask(&subtask_id);
                });
            }

            Message::SubtasksGenerated(id, suggestions) => {
                self.modify_task(&id, |task| {
                    let added = task.append_subtasks(&suggestions);
                    log::info!("Added {} generated subtasks to: {}", added, task.text);
                });
            }

            Message::IssuesFetched(issues) => {
                let now = chrono::Utc::now().timestamp_millis();
                let imported = merge::import_issues(&self.tasks, &issues, now);
                log::info!(
                    "Sync: {} issues fetched, {} imported",
                    issues.len(),
                    imported.len()
                );
                if !imported.is_empty() {
                    merge::apply_import(&mut self.tasks, imported);
                    self.save_tasks();
                }
                let now = chrono::Local::now().format("%H:%M").to_string();
                self.sync_status = SyncStatus::LastSynced(now);
            }

            Message::DisconnectTracker => {
                self.tracker = None;
                self.connection_status = ConnectionStatus::Idle;
                if let Err(e) = self.store.clear_tracker() {
                    log::error!("Failed to clear tracker config: {}", e);
                }
            }

            Message::SetFilter(kind) => {
                self.filter = kind;
            }

            Message::SearchQueryChanged(q) => {
                self.search_query = q;
            }

            Message::AddTask(_)
            | Message::GenerateSubtasks(_)
            | Message::SyncGithub
            | Message::SaveTrackerConfig(_) => {
                log::debug!("{:?} needs update(), ignoring in apply()", message);
            }
        }
    }

    fn modify_task(&mut self, id: &str, f: impl FnOnce(&mut Task)) {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                f(task);
                self.save_tasks();
            }
            None => log::warn!("No task with id {}", id),
        }
    }

    fn save_tasks(&self) {
        if let Err(e) = self.store.save_tasks(&self.tasks) {
            log::error!("Failed to save tasks: {}", e);
        }
    }

    fn save_view_state(&self) {
        if let Err(e) = self.store.save_view_state(&self.view) {
            log::error!("Failed to save view state: {}", e);
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tracker(&self) -> Option<&TrackerConfig> {
        self.tracker.as_ref()
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter::visible(&self.tasks, self.filter, &self.search_query)
    }

    pub fn stats(&self) -> Stats {
        filter::stats(&self.tasks)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.view.expanded.contains(id)
    }

    pub fn sync_status(&self) -> &SyncStatus {
        &self.sync_status
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    pub fn has_ai_credential(&self) -> bool {
        self.suggester.has_credential()
    }

    pub fn find_task(&self, prefix: &str) -> Result<&Task, LookupError> {
        resolve_prefix(&self.tasks, prefix, "task", |t| t.id.as_str())
    }

    pub fn find_subtask<'a>(
        &self,
        task: &'a Task,
        prefix: &str,
    ) -> Result<&'a Subtask, LookupError> {
        resolve_prefix(&task.subtasks, prefix, "subtask", |s| s.id.as_str())
    }
}
