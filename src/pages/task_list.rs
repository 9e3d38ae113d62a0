use taskflow::application::Application;

use crate::components::task_row::task_row;

pub fn task_list_view(app: &Application, expand_all: bool) -> String {
    let stats = app.stats();
    let mut out = String::new();

    out.push_str(&format!("{}\n", app.filter().title()));
    out.push_str(&format!(
        "You have {} active tasks remaining.\n",
        stats.active
    ));
    if !app.search_query().is_empty() {
        out.push_str(&format!("Search: \"{}\"\n", app.search_query()));
    }
    out.push('\n');

    let visible = app.visible_tasks();
    if visible.is_empty() {
        out.push_str("No tasks found\n");
        out.push_str("Get started by creating a new task with `taskflow add`.\n");
        return out;
    }

    for task in visible {
        out.push_str(&task_row(task, expand_all || app.is_expanded(&task.id)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow::core::filter::FilterKind;
    use taskflow::message::Message;
    use taskflow::store::LocalStore;
    use taskflow::sync::anthropic::{DEFAULT_MODEL, SubtaskSuggester};
    use taskflow::sync::github::GithubClient;
    use tempfile::TempDir;

    fn app(tmp: &TempDir) -> Application {
        let store = LocalStore::open(tmp.path()).unwrap();
        // Nothing here reaches the network.
        let github = GithubClient::new("http://127.0.0.1:9").unwrap();
        let suggester = SubtaskSuggester::new(None, "http://127.0.0.1:9", DEFAULT_MODEL);
        Application::new(store, github, suggester)
    }

    #[tokio::test]
    async fn empty_list() {
        let tmp = TempDir::new().unwrap();
        let view = task_list_view(&app(&tmp), false);
        assert!(view.starts_with("All Tasks\nYou have 0 active tasks remaining.\n"));
        assert!(view.contains("No tasks found"));
    }

    #[tokio::test]
    async fn filtered_and_searched() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        app.update(Message::AddTask("Buy Milk".to_string())).await;
        app.update(Message::AddTask("Write report".to_string())).await;
        app.update(Message::SetFilter(FilterKind::Active)).await;
        app.update(Message::SearchQueryChanged("milk".to_string())).await;

        let view = task_list_view(&app, false);
        assert!(view.starts_with("Active Tasks\nYou have 2 active tasks remaining.\n"));
        assert!(view.contains("Search: \"milk\""));
        assert!(view.contains("Buy Milk"));
        assert!(!view.contains("Write report"));
    }

    #[tokio::test]
    async fn expanded_tasks_show_subtasks() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        app.update(Message::AddTask("Plan trip".to_string())).await;
        let id = app.tasks()[0].id.clone();
        app.update(Message::AddSubtask(id.clone(), "Book flights".to_string())).await;

        assert!(!task_list_view(&app, false).contains("Book flights"));
        assert!(task_list_view(&app, true).contains("Book flights"));

        app.update(Message::ToggleTaskExpand(id)).await;
        assert!(task_list_view(&app, false).contains("Book flights"));
    }
}
