//! Application facade consumed by the view layer.
//!
//! [`TodoApp`] owns the task store and keeps a reflected, newest-first copy
//! of the task list together with derived statistics. Its operations never
//! return errors: a failure is logged, turned into a message available
//! through [`TodoApp::error`], and the reflection is left as it was.
//!
//! ```rust
//! use std::sync::Arc;
//! use taskbox::libs::app::TodoApp;
//! use taskbox::libs::storage::MemoryStore;
//! use taskbox::libs::task::Priority;
//!
//! let mut app = TodoApp::open(Arc::new(MemoryStore::new())).unwrap();
//! app.start();
//! app.add("Buy milk", Priority::High);
//! assert_eq!(app.stats().pending, 1);
//! ```

use crate::db::migrations::{LegacyMigration, MigrationReport};
use crate::db::tasks::Tasks;
use crate::libs::error::StoreError;
use crate::libs::messages::Message;
use crate::libs::storage::KeyValueStore;
use crate::libs::task::{NewTask, Priority, Task, TaskFilter, TaskPatch, TaskStats};
use crate::{msg_debug, msg_error};
use std::sync::Arc;

pub struct TodoApp {
    store: Tasks,
    migration: LegacyMigration,
    tasks: Vec<Task>,
    stats: TaskStats,
    loading: bool,
    error: Option<String>,
    migration_report: Option<MigrationReport>,
}

impl TodoApp {
    /// Wraps an existing store. Call [`TodoApp::start`] before anything else.
    pub fn new(store: Tasks) -> Self {
        let migration = LegacyMigration::new(store.storage().clone());

        TodoApp {
            store,
            migration,
            tasks: Vec::new(),
            stats: TaskStats::default(),
            loading: true,
            error: None,
            migration_report: None,
        }
    }

    pub fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        Ok(Self::new(Tasks::new(storage)?))
    }

    /// Runs the startup sequence: legacy migration when needed, store
    /// initialization, then loading tasks and statistics.
    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;

        if let Err(message) = self.load() {
            self.fail(message);
        }

        self.loading = false;
    }

    fn load(&mut self) -> Result<(), Message> {
        if self.migration.is_migration_needed() {
            let report = self
                .migration
                .migrate(&mut self.store)
                .map_err(|e| Message::LegacyMigrationFailed(e.to_string()))?;
            self.migration_report = Some(report);
        }

        self.store.initialize().map_err(|e| Message::TasksLoadFailed(e.to_string()))?;
        self.tasks = self.store.get_all().map_err(|e| Message::TasksLoadFailed(e.to_string()))?;
        self.refresh_stats();
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed operation, cleared by the next operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn stats(&self) -> TaskStats {
        self.stats
    }

    /// Report of the migration run during [`TodoApp::start`], if one ran.
    pub fn migration_report(&self) -> Option<&MigrationReport> {
        self.migration_report.as_ref()
    }

    pub fn migration(&self) -> &LegacyMigration {
        &self.migration
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filtered(&self, filter: &TaskFilter) -> Vec<&Task> {
        filter.apply(&self.tasks)
    }

    pub fn add(&mut self, title: &str, priority: Priority) -> Option<Task> {
        self.add_task(NewTask::new(title).with_priority(priority))
    }

    pub fn add_task(&mut self, new_task: NewTask) -> Option<Task> {
        self.error = None;
        match self.store.insert(&new_task) {
            Ok(task) => {
                self.tasks.insert(0, task.clone());
                self.refresh_stats();
                Some(task)
            }
            Err(e) => {
                self.fail(Message::TaskCreateFailed(e.to_string()));
                None
            }
        }
    }

    /// Applies a partial update. Returns the updated task, or `None` when the
    /// id is unknown or the update failed (see [`TodoApp::error`]).
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Option<Task> {
        self.error = None;
        match self.store.update(id, patch) {
            Ok(Some(task)) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task.clone();
                }
                self.refresh_stats();
                Some(task)
            }
            Ok(None) => {
                msg_debug!(Message::TaskNotFoundWithId(id.to_string()));
                None
            }
            Err(e) => {
                self.fail(Message::TaskUpdateFailed(e.to_string()));
                None
            }
        }
    }

    /// Removes a task. Returns whether it existed in the store.
    pub fn delete(&mut self, id: &str) -> bool {
        self.error = None;
        match self.store.delete(id) {
            Ok(deleted) => {
                self.tasks.retain(|task| task.id != id);
                self.refresh_stats();
                deleted
            }
            Err(e) => {
                self.fail(Message::TaskDeleteFailed(e.to_string()));
                false
            }
        }
    }

    /// Flips the completion flag of a task known to the reflection.
    pub fn toggle(&mut self, id: &str) -> Option<Task> {
        let completed = self.find(id)?.completed;
        self.update(id, &TaskPatch::completed(!completed))
    }

    /// Deletes completed tasks one by one, carrying on past failures.
    /// Returns how many were deleted.
    pub fn clear_completed(&mut self) -> usize {
        self.error = None;
        let completed: Vec<String> = self.tasks.iter().filter(|t| t.completed).map(|t| t.id.clone()).collect();

        let mut deleted = Vec::new();
        let mut failed = 0;
        for id in &completed {
            match self.store.delete(id) {
                Ok(_) => deleted.push(id.as_str()),
                Err(e) => {
                    msg_error!(Message::TaskDeleteFailed(e.to_string()));
                    failed += 1;
                }
            }
        }

        self.tasks.retain(|task| !deleted.contains(&task.id.as_str()));
        self.refresh_stats();

        if failed > 0 {
            self.fail(Message::ClearCompletedPartial(failed, completed.len()));
        }
        deleted.len()
    }

    /// Deletes every task. Returns how many rows were removed.
    pub fn clear_all(&mut self) -> usize {
        self.error = None;
        match self.store.delete_all() {
            Ok(count) => {
                self.tasks.clear();
                self.refresh_stats();
                count
            }
            Err(e) => {
                self.fail(Message::TasksClearFailed(e.to_string()));
                0
            }
        }
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.store.close()
    }

    fn refresh_stats(&mut self) {
        self.stats = match self.store.stats() {
            Ok(stats) => stats,
            Err(e) => {
                msg_debug!(Message::StatsRefreshFailed(e.to_string()));
                TaskStats::from_tasks(&self.tasks)
            }
        };
    }

    fn fail(&mut self, message: Message) {
        msg_debug!(message);
        self.error = Some(message.to_string());
    }
}
