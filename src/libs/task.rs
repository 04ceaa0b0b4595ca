//! Task record model shared by the store, the migration and the CLI.
//!
//! A [`Task`] is the persisted unit of work. New tasks are described by
//! [`NewTask`] (no id, no timestamps) and partial edits by [`TaskPatch`],
//! where every `None` field means "leave the stored value alone".

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parses a stored priority, falling back to `Medium` for anything unknown.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: &str) -> Self {
        NewTask {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update of a task.
///
/// `due_date` is tri-state: `None` leaves the column untouched,
/// `Some(None)` clears it and `Some(Some(date))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        TaskPatch {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none() && self.priority.is_none() && self.due_date.is_none()
    }
}

/// Aggregate counters over the stored tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn new(total: usize, completed: usize) -> Self {
        TaskStats {
            total,
            completed,
            pending: total.saturating_sub(completed),
        }
    }

    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self::new(tasks.len(), tasks.iter().filter(|t| t.completed).count())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

/// View-side filter over the task list.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub search: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        };
        let priority_ok = self.priority.map_or(true, |p| p == task.priority);
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                task.title.to_lowercase().contains(&query) || task.description.to_lowercase().contains(&query)
            }
        };

        status_ok && priority_ok && search_ok
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Formats a timestamp the way it is stored: RFC 3339, UTC, milliseconds.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|ts| ts.with_timezone(&Utc))
}

/// True when the timestamp survives formatting and parsing unchanged at
/// the stored precision.
pub fn is_storable(ts: &DateTime<Utc>) -> bool {
    parse_timestamp(&format_timestamp(ts)).is_some_and(|parsed| parsed.timestamp_millis() == ts.timestamp_millis())
}

/// Current time truncated to the stored precision.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    parse_timestamp(&format_timestamp(&now)).unwrap_or(now)
}
