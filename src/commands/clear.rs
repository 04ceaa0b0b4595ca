use super::{check, open_app};
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Delete every task instead of only completed ones
    #[arg(long)]
    all: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub fn cmd(clear_args: ClearArgs) -> Result<()> {
    let mut app = open_app()?;
    let stats = app.stats();

    let (count, prompt) = if clear_args.all {
        (stats.total, Message::ConfirmClearAll(stats.total))
    } else {
        (stats.completed, Message::ConfirmClearCompleted(stats.completed))
    };
    if count == 0 {
        msg_info!(if clear_args.all { Message::NoTasksFound } else { Message::NoCompletedTasks });
        return Ok(());
    }

    if !clear_args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt.to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::OperationCancelled);
            return Ok(());
        }
    }

    let deleted = if clear_args.all { app.clear_all() } else { app.clear_completed() };
    msg_success!(Message::TasksCleared(deleted));
    check(&app)
}
