use super::{check, open_app, resolve_task};
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Task id or unique id prefix
    id: String,
}

pub fn cmd(toggle_args: ToggleArgs) -> Result<()> {
    let mut app = open_app()?;
    let id = resolve_task(&app, &toggle_args.id)?.id.clone();

    let toggled = app.toggle(&id);
    check(&app)?;

    if let Some(task) = toggled {
        if task.completed {
            msg_success!(Message::TaskCompleted(task.title));
        } else {
            msg_success!(Message::TaskReopened(task.title));
        }
    }
    Ok(())
}
