use async_trait::async_trait;
use reqwest::Client;
use tasklist_core::remote::decode_response;
use tasklist_core::RemoteTask;
use tracing::{debug, info, warn};

use crate::{RemoteTaskSource, ServiceError};

pub const DEFAULT_ENDPOINT: &str = "https://dummyjson.com/todos";

/// Fetches the todos list over HTTP with a single GET.
pub struct HttpTaskSource {
    endpoint: String,
    client: Client,
}

impl HttpTaskSource {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpTaskSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl RemoteTaskSource for HttpTaskSource {
    async fn fetch(&self) -> Result<Vec<RemoteTask>, ServiceError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Network(format!(
                "unexpected status {status} from {}",
                self.endpoint
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ServiceError::Network(format!("read body: {e}")))?;
        debug!(bytes = body.len(), "received todos payload");

        let tasks = decode_response(&body).map_err(|e| {
            warn!(kind = e.kind.as_str(), field = ?e.field, "failed to decode todos: {}", e.context);
            ServiceError::from(e)
        })?;

        for task in &tasks {
            debug!(
                id = task.id,
                title = task.title.as_deref().unwrap_or("-"),
                description = task.description.as_deref().unwrap_or("-"),
                completed = task.completed,
                "remote task"
            );
        }
        info!(count = tasks.len(), endpoint = %self.endpoint, "fetched remote tasks");
        Ok(tasks)
    }
}
