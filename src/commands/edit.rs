use super::add::parse_due_date;
use super::{check, open_app, resolve_task};
use crate::libs::messages::Message;
use crate::libs::task::{Priority, TaskPatch};
use crate::{msg_info, msg_success};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task id or unique id prefix
    id: String,
    #[arg(short, long)]
    title: Option<String>,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long, value_enum)]
    priority: Option<Priority>,
    /// Due date as YYYY-MM-DD
    #[arg(long, value_parser = parse_due_date, conflicts_with = "clear_due")]
    due: Option<NaiveDate>,
    /// Remove the due date
    #[arg(long)]
    clear_due: bool,
    #[arg(long)]
    completed: Option<bool>,
}

impl EditArgs {
    fn patch(&self) -> TaskPatch {
        TaskPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
            priority: self.priority,
            due_date: match (self.due, self.clear_due) {
                (Some(due), _) => Some(Some(due)),
                (None, true) => Some(None),
                (None, false) => None,
            },
        }
    }
}

pub fn cmd(edit_args: EditArgs) -> Result<()> {
    let mut app = open_app()?;
    let id = resolve_task(&app, &edit_args.id)?.id.clone();

    let patch = edit_args.patch();
    if patch.is_empty() {
        msg_info!(Message::NoChangesDetected);
        return Ok(());
    }

    let updated = app.update(&id, &patch);
    check(&app)?;

    match updated {
        Some(task) => msg_success!(Message::TaskUpdated(task.title)),
        None => msg_info!(Message::TaskNotFoundWithId(id)),
    }
    Ok(())
}
