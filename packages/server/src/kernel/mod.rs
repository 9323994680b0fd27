//! Kernel module - server infrastructure and dependencies.

pub mod agent;
pub mod deps;
pub mod jobs;
pub mod locks;
pub mod testing;

pub use agent::{AgentError, AgentVerdict, BaseModerationAgent, HttpModerationAgent};
pub use deps::ServerDeps;
pub use locks::{BaseLockService, LockToken, RedisLockService};
