#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use taskbox::db::migrations::LEGACY_KEY;
    use taskbox::db::persistence::STATE_KEY;
    use taskbox::libs::app::TodoApp;
    use taskbox::libs::error::PersistenceError;
    use taskbox::libs::storage::{KeyValueStore, MemoryStore};
    use taskbox::libs::task::{NewTask, Priority, StatusFilter, TaskFilter, TaskPatch};
    use test_context::{test_context, TestContext};

    /// Memory store whose n-th database write from now can be made to fail.
    struct FlakyStore {
        inner: MemoryStore,
        state_writes: AtomicUsize,
        fail_at: AtomicUsize,
    }

    impl FlakyStore {
        fn new() -> Self {
            FlakyStore {
                inner: MemoryStore::new(),
                state_writes: AtomicUsize::new(0),
                fail_at: AtomicUsize::new(0),
            }
        }

        fn fail_nth_write(&self, n: usize) {
            self.fail_at.store(self.state_writes.load(Ordering::SeqCst) + n, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
            if key == STATE_KEY {
                let write = self.state_writes.fetch_add(1, Ordering::SeqCst) + 1;
                if write == self.fail_at.load(Ordering::SeqCst) {
                    return Err(PersistenceError::QuotaExceeded {
                        key: key.to_string(),
                        required: value.len(),
                        quota: 0,
                    });
                }
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), PersistenceError> {
            self.inner.remove(key)
        }
    }

    struct AppTestContext {
        storage: Arc<MemoryStore>,
    }

    impl TestContext for AppTestContext {
        fn setup() -> Self {
            AppTestContext {
                storage: Arc::new(MemoryStore::new()),
            }
        }
    }

    impl AppTestContext {
        fn app(&self) -> TodoApp {
            let mut app = TodoApp::open(self.storage.clone()).unwrap();
            app.start();
            app
        }
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_start_on_empty_storage(ctx: &mut AppTestContext) {
        let app = ctx.app();

        assert!(!app.loading());
        assert!(app.error().is_none());
        assert!(app.tasks().is_empty());
        assert_eq!(app.stats().total, 0);
        assert!(app.migration_report().is_none());
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_start_migrates_legacy_list(ctx: &mut AppTestContext) {
        ctx.storage
            .set(LEGACY_KEY, &json!([{ "id": "1", "text": "Buy milk", "completed": false }]).to_string())
            .unwrap();

        let app = ctx.app();

        assert!(app.error().is_none());
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.tasks()[0].title, "Buy milk");
        assert_eq!(app.migration_report().map(|r| r.migrated()), Some(1));
        assert!(app.migration().is_completed());
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_add_prepends_and_updates_stats(ctx: &mut AppTestContext) {
        let mut app = ctx.app();

        let first = app.add("First", Priority::Low).unwrap();
        let second = app.add("Second", Priority::High).unwrap();

        let ids: Vec<&str> = app.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert_eq!(app.stats().total, 2);
        assert_eq!(app.stats().pending, 2);
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_add_blank_title_sets_error(ctx: &mut AppTestContext) {
        let mut app = ctx.app();

        assert!(app.add("   ", Priority::Medium).is_none());
        assert!(app.error().is_some());
        assert!(app.tasks().is_empty());

        app.add("Valid", Priority::Medium).unwrap();
        assert!(app.error().is_none());
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_toggle_flips_completion(ctx: &mut AppTestContext) {
        let mut app = ctx.app();
        let task = app.add("Toggle me", Priority::Medium).unwrap();

        let toggled = app.toggle(&task.id).unwrap();
        assert!(toggled.completed);
        assert_eq!(app.stats().completed, 1);
        assert!(app.find(&task.id).unwrap().completed);

        let toggled = app.toggle(&task.id).unwrap();
        assert!(!toggled.completed);
        assert_eq!(app.stats().completed, 0);

        assert!(app.toggle("missing").is_none());
        assert!(app.error().is_none());
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_update_and_delete(ctx: &mut AppTestContext) {
        let mut app = ctx.app();
        let task = app.add_task(NewTask::new("Draft").with_description("notes")).unwrap();

        let patch = TaskPatch {
            title: Some("Final".to_string()),
            ..Default::default()
        };
        let updated = app.update(&task.id, &patch).unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(app.find(&task.id).unwrap().title, "Final");

        assert!(app.delete(&task.id));
        assert!(app.find(&task.id).is_none());
        assert!(!app.delete(&task.id));
        assert_eq!(app.stats().total, 0);
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_filtered_view(ctx: &mut AppTestContext) {
        let mut app = ctx.app();
        let done = app.add("Pay rent", Priority::High).unwrap();
        app.add("Call plumber", Priority::Low).unwrap();
        app.toggle(&done.id);

        let active = app.filtered(&TaskFilter {
            status: StatusFilter::Active,
            ..Default::default()
        });
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Call plumber");

        let searched = app.filtered(&TaskFilter {
            search: Some("RENT".to_string()),
            ..Default::default()
        });
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].id, done.id);
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_clear_completed(ctx: &mut AppTestContext) {
        let mut app = ctx.app();
        let a = app.add("A", Priority::Medium).unwrap();
        let b = app.add("B", Priority::Medium).unwrap();
        app.add("C", Priority::Medium).unwrap();
        app.toggle(&a.id);
        app.toggle(&b.id);

        assert_eq!(app.clear_completed(), 2);
        assert!(app.error().is_none());
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.tasks()[0].title, "C");
        assert_eq!(app.stats().completed, 0);
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_clear_all(ctx: &mut AppTestContext) {
        let mut app = ctx.app();
        app.add("One", Priority::Medium).unwrap();
        app.add("Two", Priority::Medium).unwrap();

        assert_eq!(app.clear_all(), 2);
        assert!(app.tasks().is_empty());

        let reopened = ctx.app();
        assert!(reopened.tasks().is_empty());
    }

    #[test_context(AppTestContext)]
    #[test]
    fn test_changes_survive_restart(ctx: &mut AppTestContext) {
        let mut app = ctx.app();
        let task = app.add("Remember me", Priority::High).unwrap();
        app.toggle(&task.id);
        app.close().unwrap();

        let reopened = ctx.app();
        assert_eq!(reopened.tasks().len(), 1);
        assert!(reopened.tasks()[0].completed);
        assert_eq!(reopened.stats().completed, 1);
    }

    #[test]
    fn test_clear_completed_continues_past_failures() {
        let storage = Arc::new(FlakyStore::new());
        let mut app = TodoApp::open(storage.clone()).unwrap();
        app.start();

        let first = app.add("First", Priority::Medium).unwrap();
        let second = app.add("Second", Priority::Medium).unwrap();
        let third = app.add("Third", Priority::Medium).unwrap();
        for id in [&first.id, &second.id, &third.id] {
            app.toggle(id).unwrap();
        }

        // Deletion runs newest first, so the second write belongs to "Second".
        storage.fail_nth_write(2);
        assert_eq!(app.clear_completed(), 2);

        assert!(app.error().is_some());
        let remaining: Vec<&str> = app.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(remaining, vec![second.id.as_str()]);
        assert_eq!(app.stats().total, 1);
        app.close().unwrap();

        let mut reopened = TodoApp::open(storage).unwrap();
        reopened.start();
        let stored: Vec<&str> = reopened.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(stored, vec![second.id.as_str()]);
    }
}
