use super::db::Db;
use crate::libs::error::StoreError;
use crate::libs::storage::KeyValueStore;
use crate::libs::task::{self, format_timestamp, NewTask, Priority, Task, TaskPatch, TaskStats};
use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::Arc;
use uuid::Uuid;

const SELECT_TASKS: &str = "SELECT id, title, description, completed, priority, due_date, created_at, updated_at FROM todos";
const ORDER_NEWEST_FIRST: &str = "ORDER BY created_at DESC, rowid DESC";
const INSERT_TASK: &str = "INSERT INTO todos (id, title, description, completed, priority, due_date, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const DELETE_TASK: &str = "DELETE FROM todos WHERE id = ?1";
const DELETE_ALL: &str = "DELETE FROM todos";
const COUNT_TASKS: &str = "SELECT COUNT(*), COALESCE(SUM(completed != 0), 0) FROM todos";

/// CRUD over the `todos` table. Every successful write is persisted before
/// the call returns.
pub struct Tasks {
    pub db: Db,
}

impl Tasks {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Result<Tasks, StoreError> {
        Ok(Tasks { db: Db::new(storage)? })
    }

    pub fn initialize(&mut self) -> Result<(), StoreError> {
        self.db.initialize()
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        self.db.bridge().storage()
    }

    /// All tasks, newest first.
    pub fn get_all(&self) -> Result<Vec<Task>, StoreError> {
        self.db.ensure_ready()?;

        let mut stmt = self.db.conn.prepare(&format!("{} {}", SELECT_TASKS, ORDER_NEWEST_FIRST))?;
        let task_iter = stmt.query_map([], row_to_task)?;
        let mut tasks = Vec::new();
        for task_result in task_iter {
            tasks.push(task_result?);
        }

        Ok(tasks)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Task>, StoreError> {
        self.db.ensure_ready()?;
        let task = fetch_one(&self.db.conn, id)?;
        Ok(task)
    }

    /// Creates a task from the given fields, applying defaults.
    pub fn insert(&mut self, new_task: &NewTask) -> Result<Task, StoreError> {
        let title = validate_title(&new_task.title)?;
        let now = task::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title,
            description: new_task.description.clone().unwrap_or_default(),
            completed: new_task.completed.unwrap_or(false),
            priority: new_task.priority.unwrap_or_default(),
            due_date: new_task.due_date,
            created_at: now,
            updated_at: now,
        };

        self.insert_record(&task)?;
        Ok(task)
    }

    /// Writes a fully formed record, keeping its id and timestamps.
    pub fn insert_record(&mut self, task: &Task) -> Result<(), StoreError> {
        validate_title(&task.title)?;
        if !task::is_storable(&task.created_at) || !task::is_storable(&task.updated_at) {
            return Err(StoreError::validation(format!("task '{}' has a timestamp outside the storable range", task.id)));
        }
        if task.created_at > task.updated_at {
            return Err(StoreError::validation(format!("task '{}' was updated before it was created", task.id)));
        }

        self.db.mutate(|conn| {
            let changed = conn.execute(
                INSERT_TASK,
                params![
                    task.id,
                    task.title,
                    task.description,
                    task.completed,
                    task.priority.as_str(),
                    task.due_date,
                    format_timestamp(&task.created_at),
                    format_timestamp(&task.updated_at),
                ],
            )?;
            Ok(((), changed))
        })
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// A missing id is not an error: nothing is written and `None` comes back.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
        let mut set_parts: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(title) = &patch.title {
            set_parts.push("title = ?");
            values.push(Value::Text(validate_title(title)?));
        }
        if let Some(description) = &patch.description {
            set_parts.push("description = ?");
            values.push(Value::Text(description.clone()));
        }
        if let Some(completed) = patch.completed {
            set_parts.push("completed = ?");
            values.push(Value::Integer(completed as i64));
        }
        if let Some(priority) = patch.priority {
            set_parts.push("priority = ?");
            values.push(Value::Text(priority.as_str().to_string()));
        }
        if let Some(due_date) = patch.due_date {
            set_parts.push("due_date = ?");
            values.push(match due_date {
                Some(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
                None => Value::Null,
            });
        }

        // Text timestamps compare chronologically, so MAX keeps updated_at monotonic.
        set_parts.push("updated_at = MAX(updated_at, ?)");
        values.push(Value::Text(format_timestamp(&task::now())));
        values.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE todos SET {} WHERE id = ?", set_parts.join(", "));
        self.db.mutate(|conn| {
            let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
            let task = if changed > 0 { fetch_one(conn, id)? } else { None };
            Ok((task, changed))
        })
    }

    /// Removes a task. Returns whether a row was deleted.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        self.db.mutate(|conn| {
            let changed = conn.execute(DELETE_TASK, [id])?;
            Ok((changed > 0, changed))
        })
    }

    pub fn delete_all(&mut self) -> Result<usize, StoreError> {
        self.db.mutate(|conn| {
            let changed = conn.execute(DELETE_ALL, [])?;
            Ok((changed, changed))
        })
    }

    pub fn stats(&self) -> Result<TaskStats, StoreError> {
        self.db.ensure_ready()?;
        let (total, completed): (i64, i64) = self.db.conn.query_row(COUNT_TASKS, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(TaskStats::new(total as usize, completed as usize))
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.db.close()
    }
}

fn validate_title(title: &str) -> Result<String, StoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation("Task title must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn fetch_one(conn: &Connection, id: &str) -> rusqlite::Result<Option<Task>> {
    conn.query_row(&format!("{} WHERE id = ?1", SELECT_TASKS), [id], row_to_task).optional()
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: String = row.get(4)?;
    let due_date: Option<String> = row.get(5)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        completed: row.get::<_, i64>(3)? != 0,
        priority: Priority::from_stored(&priority),
        due_date: due_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        created_at: timestamp_column(row, 6)?,
        updated_at: timestamp_column(row, 7)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    let raw: String = row.get(idx)?;
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
