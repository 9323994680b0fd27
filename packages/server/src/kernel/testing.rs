//! In-memory stand-ins for external collaborators, used by unit and
//! integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;

use super::agent::{AgentError, AgentVerdict, BaseModerationAgent};
use super::locks::{BaseLockService, LockToken};
use crate::domains::moderation::TargetType;

/// Process-local lock service with real TTL semantics.
#[derive(Default)]
pub struct InMemoryLockService {
    entries: Mutex<HashMap<String, (LockToken, Instant)>>,
}

impl InMemoryLockService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseLockService for InMemoryLockService {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockToken>> {
        let mut entries = self.entries.lock().unwrap();

        if let Some((_, expires_at)) = entries.get(key) {
            if *expires_at > Instant::now() {
                return Ok(None);
            }
        }

        let token = LockToken::generate();
        entries.insert(key.to_string(), (token.clone(), Instant::now() + ttl));
        Ok(Some(token))
    }

    async fn release(&self, key: &str, token: &LockToken) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();

        match entries.get(key) {
            Some((held, _)) if held == token => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// What a [`ScriptedAgent`] should do when called.
pub enum ScriptedOutcome {
    /// Respond with this action string (and optional reason).
    Action(&'static str, Option<&'static str>),
    /// Fail as if the call timed out.
    Timeout,
    /// Fail as if the agent returned this HTTP status.
    Status(u16),
}

/// Agent double that returns a scripted outcome and counts calls.
pub struct ScriptedAgent {
    outcome: ScriptedOutcome,
    calls: AtomicUsize,
}

impl ScriptedAgent {
    pub fn returning(action: &'static str) -> Self {
        Self {
            outcome: ScriptedOutcome::Action(action, None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_outcome(outcome: ScriptedOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `moderate` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseModerationAgent for ScriptedAgent {
    async fn moderate(
        &self,
        _target_type: TargetType,
        _target_id: i64,
        _content: &str,
    ) -> Result<AgentVerdict, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            ScriptedOutcome::Action(action, reason) => Ok(AgentVerdict {
                action: Some(action.to_string()),
                decision: None,
                reason: reason.map(str::to_string),
            }),
            ScriptedOutcome::Timeout => Err(AgentError::Timeout),
            ScriptedOutcome::Status(code) => Err(AgentError::Status(*code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lock_is_exclusive_until_released() {
        let locks = InMemoryLockService::new();
        let ttl = Duration::from_secs(30);

        let token = locks.try_acquire("k", ttl).await.unwrap().unwrap();
        assert!(locks.try_acquire("k", ttl).await.unwrap().is_none());

        assert!(locks.release("k", &token).await.unwrap());
        assert!(locks.try_acquire("k", ttl).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_lock_can_be_reacquired() {
        let locks = InMemoryLockService::new();

        let stale = locks
            .try_acquire("k", Duration::from_millis(0))
            .await
            .unwrap()
            .unwrap();

        // TTL of zero expires immediately; a new holder takes over.
        let fresh = locks
            .try_acquire("k", Duration::from_secs(30))
            .await
            .unwrap();
        assert!(fresh.is_some());

        // The stale token can no longer release the lock.
        assert!(!locks.release("k", &stale).await.unwrap());
    }

    #[tokio::test]
    async fn release_with_wrong_token_is_refused() {
        let locks = InMemoryLockService::new();
        let ttl = Duration::from_secs(30);

        let _held = locks.try_acquire("a", ttl).await.unwrap().unwrap();
        let other = locks.try_acquire("b", ttl).await.unwrap().unwrap();

        assert!(!locks.release("a", &other).await.unwrap());
        // Lock "a" is still held.
        assert!(locks.try_acquire("a", ttl).await.unwrap().is_none());
    }
}
