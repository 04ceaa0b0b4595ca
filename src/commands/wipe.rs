use super::open_storage;
use crate::db::migrations::LegacyMigration;
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct WipeArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub fn cmd(wipe_args: WipeArgs) -> Result<()> {
    if !wipe_args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmWipe.to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::OperationCancelled);
            return Ok(());
        }
    }

    LegacyMigration::new(open_storage()?).wipe()?;
    msg_success!(Message::StorageWiped);
    Ok(())
}
