//! Core library modules for taskbox.
//!
//! - **Record model**: [`task`]
//! - **Storage medium**: [`storage`], [`data_storage`], [`config`]
//! - **Application facade**: [`app`]
//! - **Output**: [`messages`], [`view`]
//!
//! ```rust
//! use std::sync::Arc;
//! use taskbox::libs::app::TodoApp;
//! use taskbox::libs::storage::MemoryStore;
//!
//! let mut app = TodoApp::open(Arc::new(MemoryStore::new())).unwrap();
//! app.start();
//! assert!(app.error().is_none());
//! ```

pub mod app;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod messages;
pub mod storage;
pub mod task;
pub mod view;
