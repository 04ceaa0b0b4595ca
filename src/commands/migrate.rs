use super::{check, open_storage};
use crate::db::migrations::{LegacyMigration, LEGACY_KEY};
use crate::libs::app::TodoApp;
use crate::libs::messages::Message;
use crate::{msg_info, msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(subcommand)]
    command: Option<MigrateCommand>,
}

#[derive(Debug, Subcommand)]
enum MigrateCommand {
    /// Show marker, legacy list and backup state
    Status,
    /// Put the backup back under the legacy key and clear the marker
    Restore,
    /// Clear the completion marker
    Reset,
}

pub fn cmd(args: MigrateArgs) -> Result<()> {
    let storage = open_storage()?;
    let migration = LegacyMigration::new(storage.clone());

    match args.command {
        None => {
            if !migration.is_migration_needed() {
                msg_info!(Message::MigrationNotNeeded);
                return Ok(());
            }
            // Startup runs the migration when it is needed.
            let mut app = TodoApp::open(storage)?;
            app.start();
            check(&app)?;
        }
        Some(MigrateCommand::Status) => {
            msg_print!(Message::MigrationStatus {
                completed: migration.is_completed(),
                legacy_present: storage.contains(LEGACY_KEY),
                backup_present: migration.has_backup(),
            });
        }
        Some(MigrateCommand::Restore) => {
            migration.restore_from_backup()?;
        }
        Some(MigrateCommand::Reset) => {
            migration.reset_marker()?;
            msg_success!(Message::MigrationMarkerReset);
        }
    }

    Ok(())
}
