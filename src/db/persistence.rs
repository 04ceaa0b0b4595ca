//! Bridge between the in-memory SQLite image and the key/value store.
//!
//! The exported database image is stored as a JSON array of byte values under
//! [`STATE_KEY`]; the schema version it was written with lives under
//! [`VERSION_KEY`] as a plain integer string.

use crate::libs::error::PersistenceError;
use crate::libs::messages::Message;
use crate::libs::storage::KeyValueStore;
use crate::{msg_debug, msg_warning};
use std::sync::Arc;

pub const STATE_KEY: &str = "sqlite-db";
pub const VERSION_KEY: &str = "sqlite-db-version";

#[derive(Clone)]
pub struct PersistenceBridge {
    storage: Arc<dyn KeyValueStore>,
}

impl PersistenceBridge {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        PersistenceBridge { storage }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Writes the database image under the state key.
    pub fn save(&self, state: &[u8]) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(state).map_err(|source| PersistenceError::Encode {
            key: STATE_KEY.to_string(),
            source,
        })?;
        self.storage.set(STATE_KEY, &encoded)?;
        msg_debug!(format!("Persisted database image ({} bytes)", state.len()));
        Ok(())
    }

    /// Reads the stored database image.
    ///
    /// Content that does not decode as a byte array is discarded together
    /// with the version key, and reported as absent.
    pub fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        let Some(raw) = self.storage.get(STATE_KEY) else {
            return Ok(None);
        };

        match serde_json::from_str::<Vec<u8>>(&raw) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) => {
                msg_warning!(Message::StoredDatabaseMalformed(e.to_string()));
                self.invalidate()?;
                Ok(None)
            }
        }
    }

    /// Schema version recorded with the stored image, 0 when unknown.
    pub fn current_version(&self) -> u32 {
        self.storage.get(VERSION_KEY).and_then(|v| v.trim().parse().ok()).unwrap_or(0)
    }

    pub fn record_version(&self, version: u32) -> Result<(), PersistenceError> {
        self.storage.set(VERSION_KEY, &version.to_string())
    }

    /// Drops the stored image and its version so the next start builds afresh.
    pub fn invalidate(&self) -> Result<(), PersistenceError> {
        self.storage.remove(STATE_KEY)?;
        self.storage.remove(VERSION_KEY)?;
        msg_debug!(Message::DatabaseCacheCleared);
        Ok(())
    }
}
