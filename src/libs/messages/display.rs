//! Display implementation for taskbox messages.
//!
//! All user-facing text lives here, in one `match` over [`Message`]. Call
//! sites only pick a variant and its parameters:
//!
//! ```rust
//! use taskbox::libs::messages::Message;
//!
//! let message = Message::TaskCreated("Buy milk".to_string());
//! assert_eq!(message.to_string(), "Task 'Buy milk' created");
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === TASK MESSAGES ===
            Message::TaskCreated(title) => format!("Task '{}' created", title),
            Message::TaskUpdated(title) => format!("Task '{}' updated", title),
            Message::TaskDeleted(id) => format!("Task {} deleted", id),
            Message::TaskCompleted(title) => format!("Task '{}' marked as completed", title),
            Message::TaskReopened(title) => format!("Task '{}' marked as pending", title),
            Message::TaskNotFoundWithId(id) => format!("Task with ID {} not found.", id),
            Message::AmbiguousTaskId(prefix, count) => format!("ID prefix '{}' matches {} tasks, use a longer prefix", prefix, count),
            Message::TaskCreateFailed(error) => format!("Failed to add task: {}", error),
            Message::TaskUpdateFailed(error) => format!("Failed to update task: {}", error),
            Message::TaskDeleteFailed(error) => format!("Failed to delete task: {}", error),
            Message::TasksLoadFailed(error) => format!("Failed to load tasks: {}", error),
            Message::TasksClearFailed(error) => format!("Failed to clear tasks: {}", error),
            Message::ClearCompletedPartial(failed, attempted) => {
                format!("Failed to delete {} of {} completed task(s)", failed, attempted)
            }
            Message::StatsRefreshFailed(error) => format!("Failed to update statistics: {}", error),
            Message::TasksCleared(count) => format!("Deleted {} task(s)", count),
            Message::NoTasksFound => "No tasks found.".to_string(),
            Message::NoCompletedTasks => "There are no completed tasks.".to_string(),
            Message::NoChangesDetected => "No changes detected.".to_string(),
            Message::InvalidDueDate(value) => format!("Invalid due date '{}', expected YYYY-MM-DD", value),
            Message::TaskStats { total, completed, pending } => {
                format!("Total: {}  Completed: {}  Pending: {}", total, completed, pending)
            }

            // === CONFIRMATIONS ===
            Message::ConfirmClearAll(count) => format!("Delete ALL {} task(s)? This cannot be undone.", count),
            Message::ConfirmClearCompleted(count) => format!("Delete {} completed task(s)?", count),
            Message::ConfirmDeleteTask(title) => format!("Delete task '{}'?", title),
            Message::ConfirmWipe => "Remove the stored database, migration marker and backup?".to_string(),
            Message::OperationCancelled => "Operation cancelled".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleStorage => "Storage settings".to_string(),
            Message::PromptStorageFileName => "Storage file name".to_string(),
            Message::PromptStorageQuota => "Storage quota (bytes)".to_string(),

            // === STORAGE MESSAGES ===
            Message::StorageFileUnreadable(path, error) => format!("Storage file {} is unreadable, starting empty: {}", path, error),
            Message::StorageOpenFailed(error) => format!("Failed to open storage: {}", error),
            Message::StorageWiped => "Local database, migration marker and backup removed".to_string(),

            // === DATABASE MESSAGES ===
            Message::CreatingDatabase => "Creating new database".to_string(),
            Message::DatabaseCacheCleared => "Database cache cleared".to_string(),
            Message::StoredDatabaseMalformed(error) => format!("Stored database is malformed, discarding it: {}", error),
            Message::StoredSchemaInvalid => "Stored database has an unexpected table layout, recreating it".to_string(),
            Message::SchemaVersionMismatch(recorded, expected) => {
                format!("Database version mismatch. Current: {}, Required: {}", recorded, expected)
            }
            Message::StoreInitFailed(error) => format!("Failed to initialize database: {}", error),
            Message::PersistFailed(error) => format!("Failed to save database, change reverted: {}", error),

            // === LEGACY MIGRATION MESSAGES ===
            Message::LegacyMigrationStarted(count) => format!("Migrating {} task(s) from the legacy list", count),
            Message::LegacyMigrationCompleted(count) => format!("Migration completed: {} task(s) moved", count),
            Message::LegacyMigrationFailed(error) => format!("Migration failed: {}", error),
            Message::LegacyEntrySkipped(diagnostic) => format!("Legacy {}", diagnostic),
            Message::LegacyListNotArray => "Legacy task list is not an array, nothing to migrate".to_string(),
            Message::LegacyListUnreadable(error) => format!("Legacy task list is unreadable, nothing to migrate: {}", error),
            Message::NoLegacyTasks => "No legacy tasks found to migrate".to_string(),
            Message::MigrationAlreadyCompleted => "Migration already completed".to_string(),
            Message::MigrationNotNeeded => "No migration needed".to_string(),
            Message::MigrationMarkerReset => "Migration status reset".to_string(),
            Message::MigrationStatus {
                completed,
                legacy_present,
                backup_present,
            } => format!(
                "Migration completed: {}\nLegacy list present: {}\nBackup present: {}",
                yes_no(*completed),
                yes_no(*legacy_present),
                yes_no(*backup_present)
            ),
            Message::BackupRestored => "Tasks restored from backup, migration will run on next start".to_string(),
            Message::NoBackupFound => "No backup found".to_string(),
        };

        write!(f, "{}", text)
    }
}
