//! Configuration of the taskbox installation.
//!
//! Settings are stored as pretty-printed JSON in `config.json` inside the
//! platform data directory (see [`DataStorage`]). A missing file means
//! defaults; `taskbox init` runs an interactive wizard to change them.
//!
//! ```rust,no_run
//! use taskbox::libs::config::Config;
//!
//! let config = Config::read()?;
//! println!("quota: {} bytes", config.storage().quota_bytes);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use super::storage::DEFAULT_QUOTA_BYTES;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_STORAGE_FILE: &str = "storage.json";

/// Where the key/value storage lives and how large it may grow.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StorageConfig {
    /// File name inside the data directory.
    pub file_name: String,

    /// Upper bound on the summed byte length of all keys and values.
    pub quota_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            file_name: DEFAULT_STORAGE_FILE.to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
}

impl Config {
    /// Storage settings, falling back to defaults.
    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Interactive setup, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();
        let default = config.storage();

        msg_print!(Message::ConfigModuleStorage);
        config.storage = Some(StorageConfig {
            file_name: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptStorageFileName.to_string())
                .default(default.file_name)
                .interact_text()?,
            quota_bytes: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptStorageQuota.to_string())
                .default(default.quota_bytes)
                .interact_text()?,
        });

        Ok(config)
    }
}
