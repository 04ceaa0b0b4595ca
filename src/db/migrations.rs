//! One-time migration of the legacy flat task list into the relational store.
//!
//! Older releases kept tasks as a JSON array under the `todos` key, one loose
//! object per task (`{ "id", "text", "completed", "priority", ... }`). On the
//! first start of a relational build that list is parsed, repaired and copied
//! into the `todos` table, after which a backup is written, the completion
//! marker is set and the legacy key is removed.
//!
//! ## Guarantees
//!
//! - **Once only**: the `migration-completed` marker short-circuits later runs
//! - **All or nothing**: any failure leaves the marker unset, so the next start
//!   retries; existing rows are cleared first so a retry never duplicates
//! - **Reversible**: [`LegacyMigration::restore_from_backup`] puts the backup
//!   back under the legacy key and clears the marker
//!
//! ## Parsing
//!
//! Each array element goes through [`parse_legacy_entry`], which either yields
//! a typed [`Task`] or drops the element. Repairs and drops are collected as
//! [`MigrationDiagnostic`]s and returned in the [`MigrationReport`].

use super::persistence::{STATE_KEY, VERSION_KEY};
use super::tasks::Tasks;
use crate::libs::error::{MigrationError, PersistenceError};
use crate::libs::messages::Message;
use crate::libs::storage::KeyValueStore;
use crate::libs::task::{self, format_timestamp, parse_timestamp, Priority, Task};
use crate::{msg_debug, msg_error, msg_info, msg_success, msg_warning};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub const MIGRATION_MARKER_KEY: &str = "migration-completed";
pub const LEGACY_KEY: &str = "todos";
pub const BACKUP_KEY: &str = "todos-backup";

const MARKER_DONE: &str = "true";

/// A repaired or dropped legacy entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDiagnostic {
    /// Position of the entry in the legacy array.
    pub index: usize,
    pub issue: String,
}

impl fmt::Display for MigrationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry #{}: {}", self.index, self.issue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The marker was already set; nothing was read.
    AlreadyCompleted,
    /// The legacy list held no usable records.
    NothingToMigrate,
    Migrated(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub outcome: MigrationOutcome,
    pub diagnostics: Vec<MigrationDiagnostic>,
}

impl MigrationReport {
    fn new(outcome: MigrationOutcome, diagnostics: Vec<MigrationDiagnostic>) -> Self {
        MigrationReport { outcome, diagnostics }
    }

    pub fn migrated(&self) -> usize {
        match self.outcome {
            MigrationOutcome::Migrated(count) => count,
            _ => 0,
        }
    }
}

/// Shape of a record in the backup snapshot. It mirrors the legacy format
/// (`text` holds the title) so a restored backup can be migrated again.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord<'a> {
    id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    completed: bool,
    priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
}

impl<'a> From<&'a Task> for LegacyRecord<'a> {
    fn from(task: &'a Task) -> Self {
        LegacyRecord {
            id: &task.id,
            text: &task.title,
            description: &task.description,
            completed: task.completed,
            priority: task.priority,
            due_date: task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            created_at: format_timestamp(&task.created_at),
            updated_at: format_timestamp(&task.updated_at),
        }
    }
}

pub struct LegacyMigration {
    storage: Arc<dyn KeyValueStore>,
}

impl LegacyMigration {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        LegacyMigration { storage }
    }

    pub fn is_completed(&self) -> bool {
        self.storage.get(MIGRATION_MARKER_KEY).as_deref() == Some(MARKER_DONE)
    }

    /// True when the marker is unset and a legacy list is present.
    pub fn is_migration_needed(&self) -> bool {
        !self.is_completed() && self.storage.contains(LEGACY_KEY)
    }

    pub fn has_backup(&self) -> bool {
        self.storage.contains(BACKUP_KEY)
    }

    /// Moves the legacy list into `tasks`.
    ///
    /// Returns immediately when the marker is set. Any error aborts the whole
    /// run with the marker left unset.
    pub fn migrate(&self, tasks: &mut Tasks) -> Result<MigrationReport, MigrationError> {
        if self.is_completed() {
            msg_debug!(Message::MigrationAlreadyCompleted);
            return Ok(MigrationReport::new(MigrationOutcome::AlreadyCompleted, Vec::new()));
        }

        match self.run(tasks) {
            Ok(report) => Ok(report),
            Err(e) => {
                msg_error!(Message::LegacyMigrationFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn run(&self, tasks: &mut Tasks) -> Result<MigrationReport, MigrationError> {
        tasks.initialize()?;

        let (records, diagnostics) = self.read_legacy();
        for diagnostic in &diagnostics {
            msg_warning!(Message::LegacyEntrySkipped(diagnostic.to_string()));
        }

        if records.is_empty() {
            msg_info!(Message::NoLegacyTasks);
            self.storage.set(MIGRATION_MARKER_KEY, MARKER_DONE)?;
            return Ok(MigrationReport::new(MigrationOutcome::NothingToMigrate, diagnostics));
        }

        msg_info!(Message::LegacyMigrationStarted(records.len()));

        tasks.delete_all()?;
        for record in &records {
            tasks.insert_record(record)?;
        }

        let backup: Vec<LegacyRecord<'_>> = records.iter().map(LegacyRecord::from).collect();
        let encoded = serde_json::to_string(&backup).map_err(|source| PersistenceError::Encode {
            key: BACKUP_KEY.to_string(),
            source,
        })?;
        self.storage.set(BACKUP_KEY, &encoded)?;
        self.storage.set(MIGRATION_MARKER_KEY, MARKER_DONE)?;
        self.storage.remove(LEGACY_KEY)?;

        msg_success!(Message::LegacyMigrationCompleted(records.len()));
        Ok(MigrationReport::new(MigrationOutcome::Migrated(records.len()), diagnostics))
    }

    /// Parses the legacy list into typed records.
    ///
    /// An absent key, invalid JSON or a non-array value all yield no records.
    pub fn read_legacy(&self) -> (Vec<Task>, Vec<MigrationDiagnostic>) {
        let mut diagnostics = Vec::new();
        let Some(raw) = self.storage.get(LEGACY_KEY) else {
            return (Vec::new(), diagnostics);
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                msg_warning!(Message::LegacyListNotArray);
                return (Vec::new(), diagnostics);
            }
            Err(e) => {
                msg_warning!(Message::LegacyListUnreadable(e.to_string()));
                return (Vec::new(), diagnostics);
            }
        };

        let now = task::now();
        let mut seen_ids = HashSet::new();
        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if let Some(record) = parse_legacy_entry(index, entry, now, &mut seen_ids, &mut diagnostics) {
                records.push(record);
            }
        }

        (records, diagnostics)
    }

    /// Copies the backup back under the legacy key and clears the marker.
    ///
    /// Returns `false` when there is no backup to restore.
    pub fn restore_from_backup(&self) -> Result<bool, PersistenceError> {
        let Some(backup) = self.storage.get(BACKUP_KEY) else {
            msg_info!(Message::NoBackupFound);
            return Ok(false);
        };

        self.storage.set(LEGACY_KEY, &backup)?;
        self.storage.remove(MIGRATION_MARKER_KEY)?;
        msg_success!(Message::BackupRestored);
        Ok(true)
    }

    /// Clears the completion marker so the next start re-evaluates migration.
    pub fn reset_marker(&self) -> Result<(), PersistenceError> {
        self.storage.remove(MIGRATION_MARKER_KEY)?;
        msg_debug!(Message::MigrationMarkerReset);
        Ok(())
    }

    /// Removes the stored database, its version, the marker and the backup.
    /// A legacy list, if any, is left in place.
    pub fn wipe(&self) -> Result<(), PersistenceError> {
        for key in [STATE_KEY, VERSION_KEY, MIGRATION_MARKER_KEY, BACKUP_KEY] {
            self.storage.remove(key)?;
        }
        Ok(())
    }
}

/// Turns one legacy array element into a task, or drops it.
///
/// Entries that are not objects or carry no usable title are dropped. Other
/// defects are repaired: a missing, malformed or duplicate id gets a fresh
/// one, an unknown priority becomes medium, unreadable timestamps become
/// `now`, and `updatedAt` is never left before `createdAt`.
pub fn parse_legacy_entry(
    index: usize,
    entry: &Value,
    now: DateTime<Utc>,
    seen_ids: &mut HashSet<String>,
    diagnostics: &mut Vec<MigrationDiagnostic>,
) -> Option<Task> {
    let mut note = |issue: String| diagnostics.push(MigrationDiagnostic { index, issue });

    let Some(object) = entry.as_object() else {
        note("not an object, dropped".to_string());
        return None;
    };

    let title = object
        .get("text")
        .and_then(Value::as_str)
        .or_else(|| object.get("title").and_then(Value::as_str))
        .unwrap_or("")
        .trim()
        .to_string();
    if title.is_empty() {
        note("empty title, dropped".to_string());
        return None;
    }

    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Some(other) => {
            note(format!("invalid id {}, replaced", other));
            None
        }
    };
    let id = match id {
        Some(id) if seen_ids.contains(&id) => {
            note(format!("duplicate id '{}', replaced", id));
            Uuid::new_v4().to_string()
        }
        Some(id) => id,
        None => Uuid::new_v4().to_string(),
    };
    seen_ids.insert(id.clone());

    let completed = match object.get("completed") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    };

    let priority = match object.get("priority") {
        None | Some(Value::Null) => Priority::default(),
        Some(Value::String(s)) => s.parse().unwrap_or_else(|_| {
            note(format!("unknown priority '{}', using medium", s));
            Priority::default()
        }),
        Some(other) => {
            note(format!("unknown priority {}, using medium", other));
            Priority::default()
        }
    };

    let description = object.get("description").and_then(Value::as_str).unwrap_or("").to_string();

    let due_date = match object.get("dueDate") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = value.as_str().and_then(parse_due_date);
            if parsed.is_none() {
                note(format!("unreadable due date {}, dropped", value));
            }
            parsed
        }
    };

    let created_at = legacy_timestamp(object.get("createdAt")).unwrap_or_else(|| {
        if object.get("createdAt").is_some_and(|v| !v.is_null()) {
            note("unreadable createdAt, using now".to_string());
        }
        now
    });
    let updated_at = legacy_timestamp(object.get("updatedAt"))
        .unwrap_or_else(|| {
            if object.get("updatedAt").is_some_and(|v| !v.is_null()) {
                note("unreadable updatedAt, using now".to_string());
            }
            now
        })
        .max(created_at);

    Some(Task {
        id,
        title,
        description,
        completed,
        priority,
        due_date,
        created_at,
        updated_at,
    })
}

/// Accepts RFC 3339 text or milliseconds since the epoch.
///
/// Instants that cannot be stored and read back (years outside 0000-9999)
/// are rejected.
fn legacy_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let ts = match value? {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }?;
    task::is_storable(&ts).then_some(ts)
}

fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(value).map(|ts| ts.date_naive()))
}
