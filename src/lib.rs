//! # Taskbox - local task manager
//!
//! A command-line task list. Tasks live in an in-memory SQLite database
//! whose image is persisted, after every change, into a quota-limited
//! key/value store. An older flat JSON list format is migrated into the
//! database once, on first start.
//!
//! ## Features
//!
//! - **Task Management**: Add, edit, toggle, filter and delete tasks with a priority
//! - **Versioned Storage**: Incompatible stored databases are detected and rebuilt
//! - **Legacy Migration**: One-time import of the flat task list, with backup and restore
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskbox::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
