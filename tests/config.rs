#[cfg(test)]
mod tests {
    use taskbox::libs::config::{Config, StorageConfig, DEFAULT_STORAGE_FILE};
    use taskbox::libs::storage::{FileStore, KeyValueStore, DEFAULT_QUOTA_BYTES};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// Test context with a temporary directory standing in for the data directory.
    struct ConfigTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            ConfigTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_default_config(_ctx: &mut ConfigTestContext) {
        let config = Config::default();
        assert!(config.storage.is_none());

        let storage = config.storage();
        assert_eq!(storage.file_name, DEFAULT_STORAGE_FILE);
        assert_eq!(storage.quota_bytes, DEFAULT_QUOTA_BYTES);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_reads_defaults(ctx: &mut ConfigTestContext) {
        let path = ctx.temp_dir.path().join("config.json");
        assert_eq!(Config::read_from(&path).unwrap(), Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_config(ctx: &mut ConfigTestContext) {
        let path = ctx.temp_dir.path().join("config.json");
        let config = Config {
            storage: Some(StorageConfig {
                file_name: "work.json".to_string(),
                quota_bytes: 1024 * 1024,
            }),
        };

        config.save_to(&path).unwrap();
        let loaded = Config::read_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_invalid_config_is_an_error(ctx: &mut ConfigTestContext) {
        let path = ctx.temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::read_from(&path).is_err());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_configured_quota_is_enforced(ctx: &mut ConfigTestContext) {
        let storage = StorageConfig {
            file_name: "small.json".to_string(),
            quota_bytes: 16,
        };
        let store = FileStore::open(ctx.temp_dir.path().join(&storage.file_name), storage.quota_bytes).unwrap();

        store.set("k", "short").unwrap();
        assert!(store.set("k", "a value well over sixteen bytes").is_err());
        assert_eq!(store.get("k"), Some("short".to_string()));
    }
}
