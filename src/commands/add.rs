use super::{check, open_app};
use crate::libs::messages::Message;
use crate::libs::task::{NewTask, Priority};
use crate::msg_success;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title, multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    title: Vec<String>,
    #[arg(short, long, value_enum, default_value_t = Priority::Medium)]
    priority: Priority,
    #[arg(short, long)]
    description: Option<String>,
    /// Due date as YYYY-MM-DD
    #[arg(long, value_parser = parse_due_date)]
    due: Option<NaiveDate>,
}

pub fn parse_due_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Message::InvalidDueDate(value.to_string()).to_string())
}

pub fn cmd(add_args: AddArgs) -> Result<()> {
    let mut app = open_app()?;

    let mut new_task = NewTask::new(&add_args.title.join(" ")).with_priority(add_args.priority);
    if let Some(description) = &add_args.description {
        new_task = new_task.with_description(description);
    }
    if let Some(due) = add_args.due {
        new_task = new_task.with_due_date(due);
    }

    let task = app.add_task(new_task);
    check(&app)?;

    if let Some(task) = task {
        msg_success!(Message::TaskCreated(task.title));
    }
    Ok(())
}
