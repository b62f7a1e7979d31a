use chrono::Utc;
use rusqlite::{params, Row};

use tasklist_core::TaskItem;

use crate::{Db, DbError};

fn row_to_item(row: &Row) -> rusqlite::Result<TaskItem> {
    Ok(TaskItem {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        is_completed: row.get("is_completed")?,
    })
}

fn not_found(id: &str) -> impl FnOnce(rusqlite::Error) -> DbError + '_ {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("task item {id}")),
        other => DbError::Sqlite(other),
    }
}

impl Db {
    pub fn create_item(&self, name: &str) -> Result<TaskItem, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO task_items (id, name, created_at, is_completed)
                 VALUES (?1, ?2, ?3, 0)",
                params![id, name, now],
            )?;
            let item = conn.query_row(
                "SELECT * FROM task_items WHERE id = ?1",
                params![id],
                row_to_item,
            )?;
            Ok(item)
        })
    }

    pub fn get_item(&self, id: &str) -> Result<TaskItem, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM task_items WHERE id = ?1",
                params![id],
                row_to_item,
            )
            .map_err(not_found(id))
        })
    }

    /// All items, newest first.
    pub fn list_items(&self) -> Result<Vec<TaskItem>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM task_items ORDER BY created_at DESC, rowid DESC")?;
            let items = stmt
                .query_map([], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
    }

    pub fn rename_item(&self, id: &str, name: &str) -> Result<TaskItem, DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE task_items SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task item {id}")));
            }
            conn.query_row(
                "SELECT * FROM task_items WHERE id = ?1",
                params![id],
                row_to_item,
            )
            .map_err(not_found(id))
        })
    }

    pub fn toggle_item(&self, id: &str) -> Result<TaskItem, DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE task_items SET is_completed = NOT is_completed WHERE id = ?1",
                params![id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task item {id}")));
            }
            conn.query_row(
                "SELECT * FROM task_items WHERE id = ?1",
                params![id],
                row_to_item,
            )
            .map_err(not_found(id))
        })
    }

    pub fn delete_item(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM task_items WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task item {id}")));
            }
            Ok(())
        })
    }
}
