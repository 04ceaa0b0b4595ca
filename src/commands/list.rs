use super::open_app;
use crate::libs::messages::Message;
use crate::libs::task::{Priority, StatusFilter, TaskFilter};
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
    status: StatusFilter,
    /// Case-insensitive text searched in titles and descriptions
    #[arg(short = 'q', long)]
    search: Option<String>,
    #[arg(short, long, value_enum)]
    priority: Option<Priority>,
}

pub fn cmd(list_args: ListArgs) -> Result<()> {
    let app = open_app()?;
    let filter = TaskFilter {
        status: list_args.status,
        search: list_args.search,
        priority: list_args.priority,
    };

    let tasks = app.filtered(&filter);
    if tasks.is_empty() {
        msg_info!(Message::NoTasksFound);
        return Ok(());
    }

    View::tasks(&tasks);
    let stats = app.stats();
    msg_print!(Message::TaskStats {
        total: stats.total,
        completed: stats.completed,
        pending: stats.pending,
    });
    Ok(())
}
