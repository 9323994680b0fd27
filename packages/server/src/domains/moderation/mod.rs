//! Asynchronous content-moderation pipeline.
//!
//! Flow: a request handler persists content, the [`ModerationDispatcher`]
//! enqueues a [`ModerateContentJob`], the worker acquires the target's
//! lock, calls the external agent, and applies the verdict. The agent
//! may also push an authoritative verdict later through the internal
//! webhook, which lands via the same [`apply_verdict`] path.

pub mod apply;
pub mod dispatcher;
pub mod verdict;
pub mod worker;

pub use apply::{apply_verdict, ApplyOutcome};
pub use dispatcher::{ModerateContentJob, ModerationDispatcher};
pub use verdict::{lock_key, ModerationStatus, TargetType, Verdict, VerdictAction};
pub use worker::{register_moderation_jobs, run_moderation};
