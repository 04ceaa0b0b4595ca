use super::persistence::PersistenceBridge;
use super::schema::{self, SCHEMA_VERSION};
use crate::libs::error::{PersistenceError, StoreError};
use crate::libs::messages::Message;
use crate::libs::storage::KeyValueStore;
use crate::{msg_debug, msg_error, msg_info, msg_warning};
use rusqlite::{Connection, MAIN_DB};
use std::sync::Arc;

/// Lifecycle of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// In-memory SQLite database whose image lives in a key/value store.
///
/// The connection starts empty and [`Db::initialize`] restores it from the
/// stored image (or builds a fresh schema). Operations other than
/// `initialize` are refused until the state is [`StoreState::Ready`].
pub struct Db {
    pub conn: Connection,
    bridge: PersistenceBridge,
    state: StoreState,
}

impl Db {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Result<Db, StoreError> {
        let conn = Connection::open_in_memory()?;

        Ok(Db {
            conn,
            bridge: PersistenceBridge::new(storage),
            state: StoreState::Uninitialized,
        })
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn bridge(&self) -> &PersistenceBridge {
        &self.bridge
    }

    /// Brings the store to `Ready`. Calling it again once ready does nothing;
    /// calling it after a failure retries from scratch.
    pub fn initialize(&mut self) -> Result<(), StoreError> {
        if self.state == StoreState::Ready {
            return Ok(());
        }

        self.state = StoreState::Initializing;
        match self.open_versioned() {
            Ok(()) => {
                self.state = StoreState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = StoreState::Failed;
                msg_error!(Message::StoreInitFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn open_versioned(&mut self) -> Result<(), StoreError> {
        let recorded = self.bridge.current_version();
        if recorded != SCHEMA_VERSION {
            // 0 means no version was ever recorded, i.e. a first run.
            if recorded == 0 {
                msg_debug!(Message::SchemaVersionMismatch(recorded, SCHEMA_VERSION));
            } else {
                msg_info!(Message::SchemaVersionMismatch(recorded, SCHEMA_VERSION));
            }
            self.bridge.invalidate()?;
        }

        let mut restored = false;
        if let Some(image) = self.bridge.load()? {
            let mut conn = Connection::open_in_memory()?;
            let readable = conn.deserialize_read_exact(MAIN_DB, image.as_slice(), image.len(), false).is_ok();
            if readable && schema::verify(&conn) {
                self.conn = conn;
                restored = true;
                msg_debug!(format!("Restored database image ({} bytes)", image.len()));
            } else {
                msg_warning!(Message::StoredSchemaInvalid);
                self.bridge.invalidate()?;
            }
        }

        if !restored {
            msg_debug!(Message::CreatingDatabase);
            self.conn = Connection::open_in_memory()?;
        }

        schema::create_tables(&self.conn)?;
        if !restored {
            self.persist()?;
        }
        self.bridge.record_version(SCHEMA_VERSION)?;

        Ok(())
    }

    pub fn ensure_ready(&self) -> Result<(), StoreError> {
        match self.state {
            StoreState::Ready => Ok(()),
            _ => Err(StoreError::NotInitialized),
        }
    }

    /// Exports the current database image.
    pub fn snapshot(&self) -> Result<Vec<u8>, PersistenceError> {
        let data = self.conn.serialize(MAIN_DB).map_err(PersistenceError::Export)?;
        Ok(data.to_vec())
    }

    pub fn persist(&self) -> Result<(), PersistenceError> {
        let image = self.snapshot()?;
        self.bridge.save(&image)
    }

    fn restore_image(&mut self, image: &[u8]) -> Result<(), StoreError> {
        self.conn.deserialize_read_exact(MAIN_DB, image, image.len(), false)?;
        Ok(())
    }

    /// Runs a write against the database and persists the result.
    ///
    /// `op` returns its output together with the number of changed rows.
    /// Nothing is persisted when no row changed. If persisting fails the
    /// in-memory image is put back to what it was before `op` ran.
    pub fn mutate<T>(&mut self, op: impl FnOnce(&Connection) -> rusqlite::Result<(T, usize)>) -> Result<T, StoreError> {
        self.ensure_ready()?;

        let before = self.snapshot()?;
        let (output, changed) = op(&self.conn)?;
        if changed == 0 {
            return Ok(output);
        }

        if let Err(e) = self.persist() {
            msg_error!(Message::PersistFailed(e.to_string()));
            self.restore_image(&before)?;
            return Err(e.into());
        }

        Ok(output)
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Database(e))
    }
}
