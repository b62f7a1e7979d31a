use serde::Deserialize;
use serde_json::error::Category;

use crate::error::{DecodeError, DecodeKind};

/// Name given to an imported task whose description is missing.
pub const FALLBACK_TASK_NAME: &str = "Task not found";

/// A task as served by the remote todos endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteTask {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "todo", default)]
    pub description: Option<String>,
    pub completed: bool,
}

impl RemoteTask {
    /// Name the task gets when imported into the local store.
    pub fn local_name(&self) -> &str {
        self.description.as_deref().unwrap_or(FALLBACK_TASK_NAME)
    }
}

/// Envelope of the todos endpoint. Paging fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    pub todos: Vec<RemoteTask>,
}

/// Decode a response body into tasks, in payload order.
///
/// Either every task decodes or none are returned. The body is taken as raw
/// bytes so invalid UTF-8 is rejected as corrupted rather than replaced.
pub fn decode_response(body: &[u8]) -> Result<Vec<RemoteTask>, DecodeError> {
    serde_json::from_slice::<TaskResponse>(body)
        .map(|resp| resp.todos)
        .map_err(|e| classify(&e))
}

fn classify(err: &serde_json::Error) -> DecodeError {
    let context = err.to_string();
    let kind = match err.classify() {
        Category::Data => classify_data(&context),
        Category::Syntax | Category::Eof | Category::Io => DecodeKind::Corrupted,
    };
    let field = match kind {
        DecodeKind::KeyNotFound => backticked(&context),
        _ => None,
    };
    DecodeError {
        kind,
        field,
        context,
    }
}

fn classify_data(message: &str) -> DecodeKind {
    if message.starts_with("missing field") {
        DecodeKind::KeyNotFound
    } else if message.starts_with("invalid type: null") {
        DecodeKind::ValueNotFound
    } else if message.starts_with("invalid type") || message.starts_with("invalid value") {
        DecodeKind::TypeMismatch
    } else {
        DecodeKind::Corrupted
    }
}

/// First `quoted` segment of a serde message, e.g. the field in "missing field `id`".
fn backticked(message: &str) -> Option<String> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(message[start..start + len].to_string())
}
