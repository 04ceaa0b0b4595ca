use super::{check, open_app, resolve_task};
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Task id or unique id prefix
    id: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub fn cmd(delete_args: DeleteArgs) -> Result<()> {
    let mut app = open_app()?;
    let task = resolve_task(&app, &delete_args.id)?.clone();

    if !delete_args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteTask(task.title.clone()).to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::OperationCancelled);
            return Ok(());
        }
    }

    app.delete(&task.id);
    check(&app)?;

    msg_success!(Message::TaskDeleted(task.id));
    Ok(())
}
