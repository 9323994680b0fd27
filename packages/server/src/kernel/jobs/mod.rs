//! Job infrastructure for background command execution.
//!
//! This module provides the kernel-level plumbing for durable
//! fire-and-forget work:
//! - [`PostgresJobQueue`] - database-backed queue (jobs survive restarts)
//! - [`JobRegistry`] - job-type to handler dispatch
//! - [`JobRunner`] - long-running service that claims and executes jobs
//! - [`Job`] - the row model
//!
//! # Architecture
//!
//! ```text
//! Route handler calls queue.enqueue(command)
//!     │
//!     └─► Insert row into jobs table
//!
//! JobRunner
//!     │
//!     ├─► Claim ready rows (FOR UPDATE SKIP LOCKED)
//!     ├─► Deserialize command from JSON (JobRegistry)
//!     ├─► Run the registered handler
//!     └─► Mark succeeded/failed (queue handles retry backoff)
//! ```
//!
//! Background commands themselves live in their domains; this module
//! only provides the infrastructure.

mod job;
mod queue;
mod registry;
mod runner;

pub use job::{ErrorKind, Job, JobPriority, JobStatus};
pub use queue::{
    ClaimedJob, CommandMeta, EnqueueResult, JobQueue, JobQueueExt, PostgresJobQueue,
};
pub use registry::{JobRegistry, SharedJobRegistry};
pub use runner::{JobRunner, JobRunnerConfig};
