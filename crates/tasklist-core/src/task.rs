use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A locally persisted to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
}

impl TaskItem {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn completion_marker(&self) -> &'static str {
        if self.is_completed {
            "[x]"
        } else {
            "[ ]"
        }
    }

    /// Creation time as shown in the list, e.g. `Tuesday - 14:05`.
    pub fn created_label(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%A - %H:%M")
            .to_string()
    }
}
