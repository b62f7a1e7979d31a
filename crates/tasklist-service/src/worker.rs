//! Background fetch worker.
//!
//! The remote fetch runs on its own thread with a private current-thread
//! runtime so the interface thread never blocks on the network. The single
//! result comes back over a channel and is consumed on the interface thread.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tasklist_core::RemoteTask;
use tracing::debug;

use crate::{RemoteTaskSource, ServiceError};

type FetchResult = Result<Vec<RemoteTask>, ServiceError>;

/// Receiving end of a fetch started by [`spawn_fetch`].
pub struct FetchHandle {
    rx: Receiver<FetchResult>,
}

impl FetchHandle {
    /// Non-blocking check for the result. `None` while the fetch is in flight.
    pub fn try_take(&self) -> Option<FetchResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_gone())),
        }
    }

    /// Block until the worker reports.
    pub fn wait(self) -> FetchResult {
        self.rx.recv().unwrap_or_else(|_| Err(worker_gone()))
    }
}

fn worker_gone() -> ServiceError {
    ServiceError::Network("fetch worker exited without a result".into())
}

pub fn spawn_fetch(source: Arc<dyn RemoteTaskSource>) -> FetchHandle {
    let (tx, rx) = mpsc::channel();
    let worker_tx = tx.clone();

    let spawned = thread::Builder::new()
        .name("tasklist-fetch".into())
        .spawn(move || {
            let result = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(source.fetch()),
                Err(e) => Err(ServiceError::Network(format!("failed to start runtime: {e}"))),
            };
            debug!(ok = result.is_ok(), "fetch worker finished");
            let _ = worker_tx.send(result);
        });

    if let Err(e) = spawned {
        let _ = tx.send(Err(ServiceError::Network(format!(
            "failed to spawn fetch worker: {e}"
        ))));
    }

    FetchHandle { rx }
}
