use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore};
use crate::model::{NewTodo, Todo, TodoPatch};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS todos (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    id           TEXT NOT NULL UNIQUE,
    text         TEXT NOT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS todos_created_at ON todos (created_at, seq);
";

const SELECT_COLUMNS: &str = "SELECT id, text, is_completed, created_at FROM todos";

/// Durable store backed by a single SQLite file.
///
/// `created_at` is written as fixed-width RFC 3339 (microseconds, `Z`) so
/// text ordering matches time ordering; `seq` breaks ties.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Worker(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_row(row: &Row<'_>) -> rusqlite::Result<(String, String, bool, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_todo((id, text, is_completed, created_at): (String, String, bool, String)) -> StoreResult<Todo> {
    let id = Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt(format!("id {id}: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StoreError::Corrupt(format!("created_at {created_at}: {e}")))?
        .with_timezone(&Utc);
    Ok(Todo {
        id,
        text,
        is_completed,
        created_at,
    })
}

fn select_one(conn: &Connection, id: Uuid) -> StoreResult<Option<Todo>> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id.to_string()],
            parse_row,
        )
        .optional()?;
    row.map(into_todo).transpose()
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn insert(&self, input: NewTodo) -> StoreResult<Todo> {
        let todo = Todo {
            id: Uuid::new_v4(),
            text: input.text,
            is_completed: false,
            // match the stored precision so the returned record equals a later read
            created_at: Utc::now().trunc_subsecs(6),
        };
        let row = todo.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO todos (id, text, is_completed, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![row.id.to_string(), row.text, row.is_completed, format_time(row.created_at)],
            )?;
            Ok(())
        })
        .await?;
        Ok(todo)
    }

    async fn list(&self) -> StoreResult<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at, seq"))?;
            let rows = stmt
                .query_map([], parse_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(into_todo).collect()
        })
        .await
    }

    async fn update(&self, id: Uuid, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE todos
                 SET text = COALESCE(?2, text), is_completed = COALESCE(?3, is_completed)
                 WHERE id = ?1",
                params![id.to_string(), patch.text, patch.is_completed],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(conn, id)
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id.to_string()])?;
            Ok(changed > 0)
        })
        .await
    }
}
