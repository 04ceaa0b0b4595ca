#[derive(Debug, Clone)]
pub enum Message {
    // === TASK MESSAGES ===
    TaskCreated(String),
    TaskUpdated(String),
    TaskDeleted(String),
    TaskCompleted(String),
    TaskReopened(String),
    TaskNotFoundWithId(String),
    AmbiguousTaskId(String, usize), // prefix, matches
    TaskCreateFailed(String),       // error
    TaskUpdateFailed(String),       // error
    TaskDeleteFailed(String),       // error
    TasksLoadFailed(String),        // error
    TasksClearFailed(String),       // error
    ClearCompletedPartial(usize, usize), // failed, attempted
    StatsRefreshFailed(String),
    TasksCleared(usize),
    NoTasksFound,
    NoCompletedTasks,
    NoChangesDetected,
    InvalidDueDate(String),
    TaskStats {
        total: usize,
        completed: usize,
        pending: usize,
    },

    // === CONFIRMATIONS ===
    ConfirmClearAll(usize),
    ConfirmClearCompleted(usize),
    ConfirmDeleteTask(String),
    ConfirmWipe,
    OperationCancelled,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleStorage,
    PromptStorageFileName,
    PromptStorageQuota,

    // === STORAGE MESSAGES ===
    StorageFileUnreadable(String, String), // path, error
    StorageOpenFailed(String),
    StorageWiped,

    // === DATABASE MESSAGES ===
    CreatingDatabase,
    DatabaseCacheCleared,
    StoredDatabaseMalformed(String),
    StoredSchemaInvalid,
    SchemaVersionMismatch(u32, u32), // recorded, expected
    StoreInitFailed(String),
    PersistFailed(String),

    // === LEGACY MIGRATION MESSAGES ===
    LegacyMigrationStarted(usize),
    LegacyMigrationCompleted(usize),
    LegacyMigrationFailed(String),
    LegacyEntrySkipped(String),
    LegacyListNotArray,
    LegacyListUnreadable(String),
    NoLegacyTasks,
    MigrationAlreadyCompleted,
    MigrationNotNeeded,
    MigrationMarkerReset,
    MigrationStatus {
        completed: bool,
        legacy_present: bool,
        backup_present: bool,
    },
    BackupRestored,
    NoBackupFound,
}
