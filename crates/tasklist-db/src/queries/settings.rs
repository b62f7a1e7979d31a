use rusqlite::{params, OptionalExtension};

use crate::{Db, DbError};

/// Key of the flag set once the first remote import has succeeded.
pub const HAS_FETCHED_TASKS: &str = "has_fetched_tasks";

impl Db {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
    }

    pub fn has_fetched_tasks(&self) -> Result<bool, DbError> {
        Ok(self.get_setting(HAS_FETCHED_TASKS)?.as_deref() == Some("true"))
    }

    pub fn mark_tasks_fetched(&self) -> Result<(), DbError> {
        self.set_setting(HAS_FETCHED_TASKS, "true")
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;

    #[test]
    fn unset_setting_is_none() {
        let db = Db::open_in_memory().unwrap();
        assert_eq!(db.get_setting("theme").unwrap(), None);
    }

    #[test]
    fn set_setting_overwrites() {
        let db = Db::open_in_memory().unwrap();
        db.set_setting("theme", "dark").unwrap();
        db.set_setting("theme", "light").unwrap();
        assert_eq!(db.get_setting("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn fetched_flag_defaults_false_then_sticks() {
        let db = Db::open_in_memory().unwrap();
        assert!(!db.has_fetched_tasks().unwrap());
        db.mark_tasks_fetched().unwrap();
        db.mark_tasks_fetched().unwrap();
        assert!(db.has_fetched_tasks().unwrap());
    }
}
