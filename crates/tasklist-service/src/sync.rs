//! One-time import of remote tasks into the local store.
//!
//! The coordinator is a two-state machine seeded from the persisted
//! `has_fetched_tasks` flag. While `NotSynced` every launch attempts the
//! import; the flag is written only after a fetch succeeds, so a failed
//! launch is retried next time. Once `Synced` the remote source is never
//! consulted again.

use tasklist_core::{RemoteTask, TaskItem};
use tracing::{info, warn};

use crate::{RemoteTaskSource, ServiceError, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    NotSynced,
    Synced,
}

impl SyncState {
    pub fn from_flag(has_fetched_tasks: bool) -> Self {
        if has_fetched_tasks {
            SyncState::Synced
        } else {
            SyncState::NotSynced
        }
    }
}

/// What the caller should do after [`SyncCoordinator::start`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStep {
    /// Run the remote source and hand its result to [`SyncCoordinator::complete`].
    Fetch,
    /// Already synced; these are the stored items.
    Ready(Vec<TaskItem>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

pub struct SyncCoordinator {
    state: SyncState,
}

impl SyncCoordinator {
    pub fn new(has_fetched_tasks: bool) -> Self {
        Self {
            state: SyncState::from_flag(has_fetched_tasks),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn start(&self, store: &dyn TaskStore) -> Result<SyncStep, ServiceError> {
        match self.state {
            SyncState::Synced => Ok(SyncStep::Ready(store.list_items()?)),
            SyncState::NotSynced => Ok(SyncStep::Fetch),
        }
    }

    /// Apply a fetch result on the interface thread.
    ///
    /// Each remote task becomes one local item named after its description.
    /// A failed create is logged and skipped. On fetch failure nothing is
    /// written and the state stays `NotSynced`.
    pub fn complete(
        &mut self,
        store: &dyn TaskStore,
        fetched: Result<Vec<RemoteTask>, ServiceError>,
    ) -> Result<ImportReport, ServiceError> {
        if self.state == SyncState::Synced {
            warn!("import result ignored: tasks already synced");
            return Ok(ImportReport::default());
        }

        let tasks = fetched.map_err(|e| {
            warn!("remote fetch failed, import will be retried next launch: {e}");
            e
        })?;

        let mut report = ImportReport::default();
        for task in &tasks {
            match store.create_item(task.local_name()) {
                Ok(_) => report.imported += 1,
                Err(e) => {
                    warn!(remote_id = task.id, "skipping remote task: {e}");
                    report.skipped += 1;
                }
            }
        }

        self.state = SyncState::Synced;
        store.mark_tasks_fetched()?;
        info!(
            imported = report.imported,
            skipped = report.skipped,
            "initial import complete"
        );
        Ok(report)
    }

    /// Start, fetch if needed, and return the stored items.
    pub async fn run(
        &mut self,
        store: &dyn TaskStore,
        source: &dyn RemoteTaskSource,
    ) -> Result<Vec<TaskItem>, ServiceError> {
        match self.start(store)? {
            SyncStep::Ready(items) => Ok(items),
            SyncStep::Fetch => {
                let fetched = source.fetch().await;
                self.complete(store, fetched)?;
                store.list_items()
            }
        }
    }
}
