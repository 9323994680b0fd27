//! HTTP client for the external moderation agent.
//!
//! The agent is an opaque collaborator: we POST the target's content and
//! get back a verdict JSON. Every failure mode (timeout, connection
//! refused, non-2xx, unparseable body) is classified so the worker can
//! synthesize a fallback verdict with a useful reason string.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domains::moderation::TargetType;

/// Request body for `POST {base_url}/moderate`.
#[derive(Debug, Serialize)]
struct ModerateRequest<'a> {
    target_type: TargetType,
    target_id: i64,
    content: &'a str,
}

/// Verdict JSON returned by the agent.
///
/// The action may arrive under either `action` or `decision`; both are
/// accepted. Anything the worker cannot map is coerced to `review`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentVerdict {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AgentVerdict {
    /// The raw action string, whichever field it arrived under.
    pub fn raw_action(&self) -> Option<&str> {
        self.action.as_deref().or(self.decision.as_deref())
    }
}

/// Failure classes for an agent call.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent call timed out")]
    Timeout,

    #[error("could not connect to agent: {0}")]
    Connect(String),

    #[error("agent returned status {0}")]
    Status(u16),

    #[error("agent response could not be decoded: {0}")]
    Decode(String),

    #[error("agent request failed: {0}")]
    Transport(String),
}

impl AgentError {
    /// Short failure-class label used in fallback verdict reasons
    /// ("agent_error: Timeout", "agent_error: Status(503)", ...).
    pub fn kind(&self) -> String {
        match self {
            AgentError::Timeout => "Timeout".to_string(),
            AgentError::Connect(_) => "Connect".to_string(),
            AgentError::Status(code) => format!("Status({})", code),
            AgentError::Decode(_) => "Decode".to_string(),
            AgentError::Transport(_) => "Transport".to_string(),
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AgentError::Timeout
        } else if e.is_connect() {
            AgentError::Connect(e.to_string())
        } else if e.is_decode() {
            AgentError::Decode(e.to_string())
        } else {
            AgentError::Transport(e.to_string())
        }
    }
}

/// Moderation agent abstraction (trait for testability).
#[async_trait]
pub trait BaseModerationAgent: Send + Sync {
    /// Ask the agent to classify one target's content.
    async fn moderate(
        &self,
        target_type: TargetType,
        target_id: i64,
        content: &str,
    ) -> Result<AgentVerdict, AgentError>;
}

/// Production agent client speaking HTTP to `{base_url}/moderate`.
pub struct HttpModerationAgent {
    base_url: String,
    client: reqwest::Client,
}

impl HttpModerationAgent {
    /// Create a client with a bounded per-call timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl BaseModerationAgent for HttpModerationAgent {
    async fn moderate(
        &self,
        target_type: TargetType,
        target_id: i64,
        content: &str,
    ) -> Result<AgentVerdict, AgentError> {
        let response = self
            .client
            .post(format!("{}/moderate", self.base_url))
            .header("X-Internal-Call", "true")
            .json(&ModerateRequest {
                target_type,
                target_id,
                content,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::Status(response.status().as_u16()));
        }

        let verdict = response
            .json::<AgentVerdict>()
            .await
            .map_err(|e| AgentError::Decode(e.to_string()))?;

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_are_stable_labels() {
        assert_eq!(AgentError::Timeout.kind(), "Timeout");
        assert_eq!(AgentError::Status(503).kind(), "Status(503)");
        assert_eq!(AgentError::Decode("bad json".into()).kind(), "Decode");
    }

    #[test]
    fn raw_action_prefers_action_over_decision() {
        let verdict = AgentVerdict {
            action: Some("safe".into()),
            decision: Some("hidden".into()),
            reason: None,
        };
        assert_eq!(verdict.raw_action(), Some("safe"));

        let decision_only = AgentVerdict {
            action: None,
            decision: Some("hidden".into()),
            reason: None,
        };
        assert_eq!(decision_only.raw_action(), Some("hidden"));
    }
}
