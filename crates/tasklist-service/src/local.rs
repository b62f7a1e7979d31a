use tasklist_core::TaskItem;
use tasklist_db::{Db, DbError};

use crate::{ServiceError, TaskStore};

/// Local implementation backed by direct SQLite access.
pub struct LocalStore {
    db: Db,
}

impl LocalStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Persistence(other.to_string()),
        }
    }
}

impl TaskStore for LocalStore {
    fn list_items(&self) -> Result<Vec<TaskItem>, ServiceError> {
        Ok(self.db.list_items()?)
    }

    fn get_item(&self, id: &str) -> Result<TaskItem, ServiceError> {
        Ok(self.db.get_item(id)?)
    }

    fn create_item(&self, name: &str) -> Result<TaskItem, ServiceError> {
        Ok(self.db.create_item(name)?)
    }

    fn rename_item(&self, id: &str, name: &str) -> Result<TaskItem, ServiceError> {
        Ok(self.db.rename_item(id, name)?)
    }

    fn toggle_completed(&self, id: &str) -> Result<TaskItem, ServiceError> {
        Ok(self.db.toggle_item(id)?)
    }

    fn delete_item(&self, id: &str) -> Result<(), ServiceError> {
        Ok(self.db.delete_item(id)?)
    }

    fn has_fetched_tasks(&self) -> Result<bool, ServiceError> {
        Ok(self.db.has_fetched_tasks()?)
    }

    fn mark_tasks_fetched(&self) -> Result<(), ServiceError> {
        Ok(self.db.mark_tasks_fetched()?)
    }
}
