pub mod add;
pub mod clear;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod migrate;
pub mod toggle;
pub mod wipe;

use crate::libs::app::TodoApp;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::storage::{FileStore, KeyValueStore};
use crate::libs::task::Task;
use crate::{msg_bail_anyhow, msg_error_anyhow, msg_print};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Add a task")]
    Add(add::AddArgs),
    #[command(about = "List tasks", visible_alias = "ls")]
    List(list::ListArgs),
    #[command(about = "Edit fields of a task")]
    Edit(edit::EditArgs),
    #[command(about = "Toggle completion of a task")]
    Toggle(toggle::ToggleArgs),
    #[command(about = "Delete a task", visible_alias = "rm")]
    Delete(delete::DeleteArgs),
    #[command(about = "Delete completed (or all) tasks")]
    Clear(clear::ClearArgs),
    #[command(about = "Show task statistics")]
    Stats,
    #[command(about = "Inspect or reset the legacy list migration")]
    Migrate(migrate::MigrateArgs),
    #[command(about = "Remove the stored database, migration marker and backup")]
    Wipe(wipe::WipeArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Add(args) => add::cmd(args),
            Commands::List(args) => list::cmd(args),
            Commands::Edit(args) => edit::cmd(args),
            Commands::Toggle(args) => toggle::cmd(args),
            Commands::Delete(args) => delete::cmd(args),
            Commands::Clear(args) => clear::cmd(args),
            Commands::Stats => {
                let app = open_app()?;
                let stats = app.stats();
                msg_print!(Message::TaskStats {
                    total: stats.total,
                    completed: stats.completed,
                    pending: stats.pending,
                });
                Ok(())
            }
            Commands::Migrate(args) => migrate::cmd(args),
            Commands::Wipe(args) => wipe::cmd(args),
        }
    }
}

/// Opens the configured key/value storage.
pub fn open_storage() -> Result<Arc<dyn KeyValueStore>> {
    let config = Config::read()?;
    let store = FileStore::from_config(&config.storage()).map_err(|e| msg_error_anyhow!(Message::StorageOpenFailed(e.to_string())))?;
    Ok(Arc::new(store))
}

/// Opens the storage and runs the application startup sequence.
pub fn open_app() -> Result<TodoApp> {
    let mut app = TodoApp::open(open_storage()?)?;
    app.start();
    check(&app)?;

    Ok(app)
}

/// Finds a task by full id or unique id prefix.
pub fn resolve_task<'a>(app: &'a TodoApp, id: &str) -> Result<&'a Task> {
    if let Some(task) = app.find(id) {
        return Ok(task);
    }

    let matches: Vec<&Task> = app.tasks().iter().filter(|task| task.id.starts_with(id)).collect();
    match matches.as_slice() {
        [task] => Ok(*task),
        [] => msg_bail_anyhow!(Message::TaskNotFoundWithId(id.to_string())),
        _ => msg_bail_anyhow!(Message::AmbiguousTaskId(id.to_string(), matches.len())),
    }
}

/// Turns a facade error, if any, into a command failure.
pub fn check(app: &TodoApp) -> Result<()> {
    match app.error() {
        Some(error) => anyhow::bail!("❌ {}", error),
        None => Ok(()),
    }
}
