#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use std::sync::Arc;
    use taskbox::db::db::StoreState;
    use taskbox::db::tasks::Tasks;
    use taskbox::libs::error::StoreError;
    use taskbox::libs::storage::{KeyValueStore, MemoryStore};
    use taskbox::libs::task::{NewTask, Priority, TaskPatch};
    use test_context::{test_context, TestContext};

    struct TaskTestContext {
        storage: Arc<MemoryStore>,
        tasks: Tasks,
    }

    impl TestContext for TaskTestContext {
        fn setup() -> Self {
            let storage = Arc::new(MemoryStore::new());
            let mut tasks = Tasks::new(storage.clone()).unwrap();
            tasks.initialize().unwrap();
            TaskTestContext { storage, tasks }
        }
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_insert_applies_defaults(ctx: &mut TaskTestContext) {
        let task = ctx.tasks.insert(&NewTask::new("  Review code  ")).unwrap();

        assert_eq!(task.title, "Review code");
        assert_eq!(task.description, "");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert_eq!(task.created_at, task.updated_at);
        assert!(!task.id.is_empty());
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_insert_round_trip(ctx: &mut TaskTestContext) {
        let due = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let created = ctx
            .tasks
            .insert(
                &NewTask::new("Write report")
                    .with_priority(Priority::High)
                    .with_description("Quarterly numbers")
                    .with_due_date(due),
            )
            .unwrap();

        let fetched = ctx.tasks.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.due_date, Some(due));
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_ids_are_unique(ctx: &mut TaskTestContext) {
        let a = ctx.tasks.insert(&NewTask::new("Same title")).unwrap();
        let b = ctx.tasks.insert(&NewTask::new("Same title")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(ctx.tasks.get_all().unwrap().len(), 2);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_whitespace_title_is_rejected(ctx: &mut TaskTestContext) {
        let state_before = ctx.storage.get("sqlite-db");

        let result = ctx.tasks.insert(&NewTask::new("   "));
        assert!(matches!(result, Err(StoreError::Validation(_))));

        assert!(ctx.tasks.get_all().unwrap().is_empty());
        assert_eq!(ctx.storage.get("sqlite-db"), state_before);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_partial_update(ctx: &mut TaskTestContext) {
        let task = ctx
            .tasks
            .insert(&NewTask::new("Original").with_description("Keep me").with_priority(Priority::Low))
            .unwrap();

        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = ctx.tasks.update(&task.id, &patch).unwrap().unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "Keep me");
        assert_eq!(updated.priority, Priority::Low);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_update_clears_due_date(ctx: &mut TaskTestContext) {
        let due = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let task = ctx.tasks.insert(&NewTask::new("Renew passport").with_due_date(due)).unwrap();

        let patch = TaskPatch {
            due_date: Some(None),
            ..Default::default()
        };
        let updated = ctx.tasks.update(&task.id, &patch).unwrap().unwrap();
        assert_eq!(updated.due_date, None);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_update_rejects_blank_title(ctx: &mut TaskTestContext) {
        let task = ctx.tasks.insert(&NewTask::new("Keep title")).unwrap();

        let patch = TaskPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(ctx.tasks.update(&task.id, &patch), Err(StoreError::Validation(_))));
        assert_eq!(ctx.tasks.get_by_id(&task.id).unwrap().unwrap().title, "Keep title");
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_missing_id_is_a_no_op(ctx: &mut TaskTestContext) {
        ctx.tasks.insert(&NewTask::new("Existing")).unwrap();
        let state_before = ctx.storage.get("sqlite-db");

        assert_eq!(ctx.tasks.update("missing", &TaskPatch::completed(true)).unwrap(), None);
        assert!(!ctx.tasks.delete("missing").unwrap());
        assert_eq!(ctx.tasks.get_by_id("missing").unwrap(), None);

        assert_eq!(ctx.storage.get("sqlite-db"), state_before);
        assert_eq!(ctx.tasks.get_all().unwrap().len(), 1);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_delete(ctx: &mut TaskTestContext) {
        let task = ctx.tasks.insert(&NewTask::new("Temporary")).unwrap();

        assert!(ctx.tasks.delete(&task.id).unwrap());
        assert_eq!(ctx.tasks.get_by_id(&task.id).unwrap(), None);
        assert!(!ctx.tasks.delete(&task.id).unwrap());
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_list_is_newest_first(ctx: &mut TaskTestContext) {
        let first = ctx.tasks.insert(&NewTask::new("First")).unwrap();
        let second = ctx.tasks.insert(&NewTask::new("Second")).unwrap();
        let third = ctx.tasks.insert(&NewTask::new("Third")).unwrap();

        let ids: Vec<String> = ctx.tasks.get_all().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_stats(ctx: &mut TaskTestContext) {
        let a = ctx.tasks.insert(&NewTask::new("A")).unwrap();
        ctx.tasks.insert(&NewTask::new("B")).unwrap();
        ctx.tasks.insert(&NewTask::new("C")).unwrap();
        ctx.tasks.update(&a.id, &TaskPatch::completed(true)).unwrap();

        let stats = ctx.tasks.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.total, stats.completed + stats.pending);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_delete_all(ctx: &mut TaskTestContext) {
        for i in 1..=4 {
            ctx.tasks.insert(&NewTask::new(&format!("Task {}", i))).unwrap();
        }

        assert_eq!(ctx.tasks.delete_all().unwrap(), 4);
        assert!(ctx.tasks.get_all().unwrap().is_empty());
        assert_eq!(ctx.tasks.delete_all().unwrap(), 0);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_initialize_is_idempotent(ctx: &mut TaskTestContext) {
        let task = ctx.tasks.insert(&NewTask::new("Survives")).unwrap();

        ctx.tasks.initialize().unwrap();
        ctx.tasks.initialize().unwrap();

        assert_eq!(ctx.tasks.db.state(), StoreState::Ready);
        assert_eq!(ctx.tasks.get_all().unwrap(), vec![task]);
    }
}
