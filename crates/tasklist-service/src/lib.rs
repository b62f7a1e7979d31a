mod http;
mod local;
pub mod sync;
mod traits;
pub mod worker;

pub use http::{HttpTaskSource, DEFAULT_ENDPOINT};
pub use local::LocalStore;
pub use sync::{ImportReport, SyncCoordinator, SyncState, SyncStep};
pub use traits::{RemoteTaskSource, ServiceError, TaskStore};
pub use worker::{spawn_fetch, FetchHandle};
