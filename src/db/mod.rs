//! Relational storage layer.
//!
//! The task table lives in an in-memory SQLite database. Its image is
//! exported after every write and kept in a key/value store, together with
//! the schema version it was written with.
//!
//! ```rust
//! use std::sync::Arc;
//! use taskbox::db::tasks::Tasks;
//! use taskbox::libs::storage::MemoryStore;
//! use taskbox::libs::task::NewTask;
//!
//! let mut tasks = Tasks::new(Arc::new(MemoryStore::new())).unwrap();
//! tasks.initialize().unwrap();
//! let task = tasks.insert(&NewTask::new("Review code")).unwrap();
//! assert_eq!(tasks.get_all().unwrap(), vec![task]);
//! ```

/// Connection ownership, lifecycle state and write-then-persist handling.
pub mod db;

/// One-time import of the legacy flat task list.
pub mod migrations;

/// Encoding of the database image into the key/value store.
pub mod persistence;

/// Table layout, schema version and layout verification.
pub mod schema;

/// CRUD operations on tasks.
pub mod tasks;
