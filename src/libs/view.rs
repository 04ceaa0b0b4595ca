use super::task::Task;
use prettytable::{row, Table};

/// Length of the id prefix shown in listings; `resolve_task` accepts it.
const SHORT_ID_LEN: usize = 8;

pub struct View {}

impl View {
    pub fn tasks(tasks: &[&Task]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "DONE", "PRIORITY", "TITLE", "DESCRIPTION", "DUE", "CREATED"]);
        for task in tasks {
            let done = if task.completed { "x" } else { "" };
            let due = task.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
            table.add_row(row![
                short_id(&task.id),
                done,
                task.priority,
                task.title,
                task.description,
                due,
                task.created_at.format("%Y-%m-%d %H:%M")
            ]);
        }
        table.printstd();
    }
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
