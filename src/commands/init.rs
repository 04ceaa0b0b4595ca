//! Interactive configuration of the storage location and quota.

use crate::{
    libs::{config::Config, messages::Message},
    msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write the default configuration without prompting
    #[arg(short, long)]
    defaults: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    let config = if init_args.defaults { Config::default() } else { Config::init()? };
    config.save()?;

    msg_success!(Message::ConfigSaved);
    Ok(())
}
