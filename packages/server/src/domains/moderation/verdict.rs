//! Verdict and moderation-state types.

use serde::{Deserialize, Serialize};

/// Which table a moderation target lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Post,
    Comment,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Post => "post",
            TargetType::Comment => "comment",
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation state of a target row. Stored as lowercase text.
///
/// Every create or edit resets the row to `Pending`; a verdict moves it
/// to one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Safe,
    Hidden,
    Review,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Safe => "safe",
            ModerationStatus::Hidden => "hidden",
            ModerationStatus::Review => "review",
        }
    }
}

/// Classification outcome for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictAction {
    Safe,
    Hidden,
    Review,
}

impl VerdictAction {
    /// Normalize a raw action string from the agent or a webhook.
    ///
    /// Trims and lower-cases, then coerces anything unrecognized to
    /// `Review`. Failing toward caution: junk never becomes a silent
    /// accept.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "safe" => VerdictAction::Safe,
            "hidden" => VerdictAction::Hidden,
            _ => VerdictAction::Review,
        }
    }

    /// The moderation status this action maps onto.
    pub fn status(&self) -> ModerationStatus {
        match self {
            VerdictAction::Safe => ModerationStatus::Safe,
            VerdictAction::Hidden => ModerationStatus::Hidden,
            VerdictAction::Review => ModerationStatus::Review,
        }
    }
}

/// A verdict on its way to being applied.
///
/// Produced by the moderation worker (from an agent response or as a
/// synthesized fallback) or by the inbound webhook; consumed exactly
/// once by the result applier.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub target_type: TargetType,
    pub target_id: i64,
    pub action: VerdictAction,
    pub reason: Option<String>,
}

/// Lock-store key guarding one target's in-flight moderation attempt.
pub fn lock_key(target_type: TargetType, target_id: i64) -> String {
    format!("moderation:lock:{}:{}", target_type, target_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_known_actions_case_insensitively() {
        assert_eq!(VerdictAction::normalize("safe"), VerdictAction::Safe);
        assert_eq!(VerdictAction::normalize("SAFE"), VerdictAction::Safe);
        assert_eq!(VerdictAction::normalize("  Hidden "), VerdictAction::Hidden);
        assert_eq!(VerdictAction::normalize("review"), VerdictAction::Review);
    }

    #[test]
    fn normalize_coerces_junk_to_review() {
        assert_eq!(VerdictAction::normalize(""), VerdictAction::Review);
        assert_eq!(VerdictAction::normalize("allow"), VerdictAction::Review);
        assert_eq!(VerdictAction::normalize("DELETE"), VerdictAction::Review);
        assert_eq!(VerdictAction::normalize("🤷"), VerdictAction::Review);
    }

    #[test]
    fn actions_map_to_matching_statuses() {
        assert_eq!(VerdictAction::Safe.status(), ModerationStatus::Safe);
        assert_eq!(VerdictAction::Hidden.status(), ModerationStatus::Hidden);
        assert_eq!(VerdictAction::Review.status(), ModerationStatus::Review);
    }

    #[test]
    fn lock_keys_are_scoped_per_target() {
        assert_eq!(lock_key(TargetType::Post, 7), "moderation:lock:post:7");
        assert_eq!(
            lock_key(TargetType::Comment, 7),
            "moderation:lock:comment:7"
        );
    }
}
