use crate::roster::SnapshotStorage;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "seating.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;

    // Key/value entries standing in for the browser's local storage.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_storage(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    // Existing workspaces may predate updated_at.
    ensure_app_storage_updated_at(&conn)?;

    Ok(conn)
}

pub fn storage_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM app_storage WHERE key = ?",
            [key],
            |r| r.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

pub fn storage_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO app_storage(key, value, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        (key, value, &now),
    )?;
    Ok(())
}

impl SnapshotStorage for Connection {
    fn read_entry(&self, key: &str) -> anyhow::Result<Option<String>> {
        storage_get(self, key)
    }

    fn write_entry(&self, key: &str, value: &str) -> anyhow::Result<()> {
        storage_set(self, key, value)
    }
}

fn ensure_app_storage_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "app_storage", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE app_storage ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
