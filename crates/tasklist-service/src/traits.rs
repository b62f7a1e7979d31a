use async_trait::async_trait;
use tasklist_core::{DecodeError, DecodeKind, RemoteTask, TaskItem};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error(
        "decoding error: {kind}{}: {context}",
        .field.as_deref().map(|f| format!(" `{f}`")).unwrap_or_default()
    )]
    Decoding {
        kind: DecodeKind,
        field: Option<String>,
        context: String,
    },

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<DecodeError> for ServiceError {
    fn from(e: DecodeError) -> Self {
        ServiceError::Decoding {
            kind: e.kind,
            field: e.field,
            context: e.context,
        }
    }
}

/// Durable CRUD over local task items plus the one-time import flag.
///
/// The TUI programs against this trait; `LocalStore` wraps the SQLite `Db`.
/// Every call is made from the interface thread.
pub trait TaskStore: Send + Sync {
    /// Snapshot of all items, newest first.
    fn list_items(&self) -> Result<Vec<TaskItem>, ServiceError>;
    fn get_item(&self, id: &str) -> Result<TaskItem, ServiceError>;
    fn create_item(&self, name: &str) -> Result<TaskItem, ServiceError>;
    fn rename_item(&self, id: &str, name: &str) -> Result<TaskItem, ServiceError>;
    fn toggle_completed(&self, id: &str) -> Result<TaskItem, ServiceError>;
    fn delete_item(&self, id: &str) -> Result<(), ServiceError>;

    fn has_fetched_tasks(&self) -> Result<bool, ServiceError>;
    fn mark_tasks_fetched(&self) -> Result<(), ServiceError>;
}

/// Where the first-run import pulls tasks from.
#[async_trait]
pub trait RemoteTaskSource: Send + Sync {
    /// One attempt, no retry.
    async fn fetch(&self) -> Result<Vec<RemoteTask>, ServiceError>;
}
