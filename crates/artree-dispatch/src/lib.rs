//! Parallel file hashing for artree.
//!
//! A [`Dispatcher`] owns a bounded task channel and a fixed set of OS worker
//! threads. The coordinating thread submits [`FileTask`]s; each worker opens
//! the file, streams it through the target tree's hash engine and inserts
//! the resulting reference.
//!
//! ```text
//! coordinator ──submit──▶ bounded channel ──▶ worker 0 ─┐
//!                                         ──▶ worker 1 ─┼─▶ Arc<ArtifactTree>
//!                                         ──▶ worker N ─┘
//! finish(): close channel, join all workers, aggregate stats
//! ```
//!
//! Because the tree is a sorted set, the final identity does not depend on
//! which worker handled which file or in which order.

pub mod cancel;
pub mod config;
pub mod discover;
pub mod dispatcher;
pub mod error;
pub mod task;

pub use cancel::CancelToken;
pub use config::{DispatchConfig, FailurePolicy};
pub use discover::{discover, DiscoveredFile};
pub use dispatcher::{DispatchReport, Dispatcher, WorkerStats};
pub use error::{DispatchError, DispatchResult};
pub use task::{FileTask, TaskError, TaskFailure};
