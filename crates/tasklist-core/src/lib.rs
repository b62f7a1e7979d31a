pub mod error;
pub mod remote;
pub mod task;

pub use error::{DecodeError, DecodeKind};
pub use remote::RemoteTask;
pub use task::TaskItem;
