//! Relational schema of the task store.
//!
//! The schema is versioned as a whole: when the structure changes,
//! [`SCHEMA_VERSION`] is bumped and any persisted image carrying a different
//! version is discarded at startup instead of being migrated in place.

use rusqlite::Connection;

/// Version of the relational structure this build expects.
pub const SCHEMA_VERSION: u32 = 2;

pub const TODOS_TABLE: &str = "todos";

const CREATE_TODOS: &str = "CREATE TABLE IF NOT EXISTS todos (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    priority TEXT NOT NULL DEFAULT 'medium',
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Columns the `todos` table must expose, in declaration order.
pub const TODOS_COLUMNS: [&str; 8] = ["id", "title", "description", "completed", "priority", "due_date", "created_at", "updated_at"];

/// Creates the task table if it does not exist yet.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(CREATE_TODOS, [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at)", [])?;
    Ok(())
}

/// Lists the column names of a table, empty if the table does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt.query_map([table], |row| row.get::<_, String>(0))?.collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Checks that the `todos` table has exactly the expected column set.
///
/// Any error while inspecting the database (for instance an image that is
/// not a SQLite file at all) counts as a failed verification.
pub fn verify(conn: &Connection) -> bool {
    match table_columns(conn, TODOS_TABLE) {
        Ok(mut columns) => {
            let mut expected: Vec<String> = TODOS_COLUMNS.iter().map(|c| c.to_string()).collect();
            columns.sort();
            expected.sort();
            columns == expected
        }
        Err(_) => false,
    }
}
