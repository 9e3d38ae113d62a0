use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use taskflow::application::Application;
use taskflow::core::filter::FilterKind;
use taskflow::core::tracker::TrackerConfig;
use taskflow::message::Message;
use taskflow::sync::{ConnectionStatus, SyncStatus, keyring};

use crate::components::task_row::task_row;
use crate::pages;

#[derive(Parser)]
#[command(
    name = "taskflow",
    about = "Local tasks with one-way GitHub issue sync and AI subtask suggestions",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read settings from this file instead of the default location
    #[arg(long, global = true, value_name = "FILE", env = "TASKFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store tasks in a different directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level to the journal
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks (default)
    List(ListArgs),
    /// Add a task; also opens a GitHub issue when connected
    Add(TextArgs),
    /// Toggle a task between active and completed
    Done(IdArgs),
    /// Delete a task
    Delete(IdArgs),
    /// Show or hide a task's subtasks in the list
    Expand(IdArgs),
    /// Manage subtasks
    #[command(subcommand)]
    Sub(SubCmd),
    /// Ask the AI for subtasks and append them
    Generate(IdArgs),
    /// Import open GitHub issues as tasks
    Sync,
    /// Connect a GitHub repository
    Connect(ConnectArgs),
    /// Forget the GitHub connection
    Disconnect,
    /// Show connection settings
    Settings,
    /// Store or remove the Anthropic API key in the system keyring
    #[command(subcommand)]
    AiKey(AiKeyCmd),
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Narrow by completion status
    #[arg(short, long, default_value_t = FilterKind::All, value_parser = FilterKind::from_str)]
    pub filter: FilterKind,
    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,
    /// Show subtasks for every task
    #[arg(long)]
    pub expand: bool,
}

#[derive(Args)]
pub struct TextArgs {
    /// Task text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task id or unique id prefix
    pub id: String,
}

#[derive(Args)]
pub struct ConnectArgs {
    /// Personal access token (classic) with `repo` scope
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,
    /// Repository owner
    #[arg(long)]
    pub owner: String,
    /// Repository name
    #[arg(long)]
    pub repo: String,
}

#[derive(Subcommand)]
pub enum SubCmd {
    /// Add a subtask
    Add {
        /// Task id or prefix
        id: String,
        /// Subtask text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Toggle a subtask's completion
    Done {
        /// Task id or prefix
        id: String,
        /// Subtask id or prefix
        sub: String,
    },
    /// Delete a subtask
    Delete {
        /// Task id or prefix
        id: String,
        /// Subtask id or prefix
        sub: String,
    },
}

#[derive(Subcommand)]
pub enum AiKeyCmd {
    /// Save a key
    Set {
        key: String,
    },
    /// Remove the stored key
    Clear,
}

pub async fn dispatch(app: &mut Application, cli: Cli) -> Result<(), Box<dyn Error>> {
    let command = cli
        .command
        .unwrap_or_else(|| Commands::List(ListArgs::default()));

    match command {
        Commands::List(args) => {
            app.update(Message::SetFilter(args.filter)).await;
            if let Some(query) = args.search {
                app.update(Message::SearchQueryChanged(query)).await;
            }
            print!("{}", pages::task_list::task_list_view(app, args.expand));
        }

        Commands::Add(args) => {
            let text = args.text.join(" ");
            if text.trim().is_empty() {
                return Err("task text cannot be empty".into());
            }
            app.update(Message::AddTask(text)).await;
            if let Some(task) = app.tasks().first() {
                print!("{}", task_row(task, false));
            }
        }

        Commands::Done(args) => {
            let id = app.find_task(&args.id)?.id.clone();
            app.update(Message::ToggleTaskDone(id.clone())).await;
            print_task(app, &id);
        }

        Commands::Delete(args) => {
            let task = app.find_task(&args.id)?;
            let (id, text) = (task.id.clone(), task.text.clone());
            app.update(Message::DeleteTask(id)).await;
            println!("Deleted: {}", text);
        }

        Commands::Expand(args) => {
            let id = app.find_task(&args.id)?.id.clone();
            app.update(Message::ToggleTaskExpand(id.clone())).await;
            print_task(app, &id);
        }

        Commands::Sub(cmd) => run_sub(app, cmd).await?,

        Commands::Generate(args) => {
            let task = app.find_task(&args.id)?;
            if task.completed {
                return Err(format!(
                    "'{}' is completed; reopen it to generate subtasks",
                    task.text
                )
                .into());
            }
            let id = task.id.clone();
            let before = task.subtasks.len();

            app.update(Message::GenerateSubtasks(id.clone())).await;

            let added = app.find_task(&id)?.subtasks.len() - before;
            if added == 0 {
                println!("No suggestions this time. Try again later.");
            } else if !app.has_ai_credential() {
                println!("No Anthropic API key configured; added placeholder subtasks.");
            }
            print_task(app, &id);
        }

        Commands::Sync => {
            let Some(slug) = app.tracker().map(|t| t.slug()) else {
                return Err("GitHub is not connected; run `taskflow connect` first".into());
            };
            let before = app.tasks().len();
            app.update(Message::SyncGithub).await;
            match app.sync_status() {
                SyncStatus::Error(alert) => {
                    eprint!("{}", pages::alert(alert));
                    return Err("sync failed".into());
                }
                SyncStatus::LastSynced(at) => {
                    println!(
                        "Synced {} at {}: {} new tasks",
                        slug,
                        at,
                        app.tasks().len() - before
                    );
                }
                SyncStatus::Idle => {}
            }
        }

        Commands::Connect(args) => {
            let config = TrackerConfig::new(args.token, args.owner, args.repo);
            app.update(Message::SaveTrackerConfig(config)).await;
            match app.connection_status() {
                ConnectionStatus::Connected => print!("{}", pages::settings::settings_view(app)),
                _ => return Err("Invalid Token or Connection Failed".into()),
            }
        }

        Commands::Disconnect => {
            app.update(Message::DisconnectTracker).await;
            println!("Disconnected from GitHub.");
        }

        Commands::Settings => {
            print!("{}", pages::settings::settings_view(app));
        }

        Commands::AiKey(cmd) => run_ai_key(&cmd).await?,
    }

    Ok(())
}

async fn run_sub(app: &mut Application, cmd: SubCmd) -> Result<(), Box<dyn Error>> {
    let task_id = match cmd {
        SubCmd::Add { id, text } => {
            let id = app.find_task(&id)?.id.clone();
            app.update(Message::AddSubtask(id.clone(), text.join(" "))).await;
            id
        }
        SubCmd::Done { id, sub } => {
            let task = app.find_task(&id)?;
            let sub_id = app.find_subtask(task, &sub)?.id.clone();
            let id = task.id.clone();
            app.update(Message::ToggleSubtaskDone(id.clone(), sub_id)).await;
            id
        }
        SubCmd::Delete { id, sub } => {
            let task = app.find_task(&id)?;
            let sub_id = app.find_subtask(task, &sub)?.id.clone();
            let id = task.id.clone();
            app.update(Message::DeleteSubtask(id.clone(), sub_id)).await;
            id
        }
    };
    print_task(app, &task_id);
    Ok(())
}

async fn run_ai_key(cmd: &AiKeyCmd) -> Result<(), Box<dyn Error>> {
    match cmd {
        AiKeyCmd::Set { key } => {
            keyring::store_api_key(key).await?;
            println!("API key saved to the system keyring.");
        }
        AiKeyCmd::Clear => {
            keyring::delete_api_key().await?;
            println!("API key removed.");
        }
    }
    Ok(())
}

fn print_task(app: &Application, id: &str) {
    if let Ok(task) = app.find_task(id) {
        print!("{}", task_row(task, app.is_expanded(id)));
    }
}
