//! Internal webhook for out-of-band moderation verdicts.
//!
//! The agent may push an authoritative verdict after the fact (for
//! example after a slow human-in-the-loop review). This endpoint lets an
//! external process mutate moderation state directly, so it is gated on
//! the shared internal-call marker. It does no locking of its own: the
//! result applier's idempotent overwrite is sufficient, since the
//! webhook path never competes for the classification call itself.

use axum::{
    extract::Extension,
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::ApiError;
use crate::domains::moderation::{apply_verdict, TargetType, Verdict, VerdictAction};
use crate::server::app::AxumAppState;

const INTERNAL_CALL_HEADER: &str = "x-internal-call";

#[derive(Debug, Deserialize)]
pub struct ModerationResultPayload {
    pub target_type: TargetType,
    pub target_id: i64,
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct ModerationResultResponse {
    success: bool,
}

/// POST /internal/moderation-result
///
/// 403 unless the `X-Internal-Call: true` marker is present. Accepted
/// verdicts go through the same normalization as agent responses, so a
/// malformed action still lands as `review`.
pub async fn moderation_result_handler(
    Extension(state): Extension<AxumAppState>,
    headers: HeaderMap,
    Json(body): Json<ModerationResultPayload>,
) -> Result<Json<ModerationResultResponse>, ApiError> {
    let authorized = headers
        .get(INTERNAL_CALL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "true")
        .unwrap_or(false);

    if !authorized {
        return Err(ApiError::Forbidden);
    }

    let verdict = Verdict {
        target_type: body.target_type,
        target_id: body.target_id,
        action: VerdictAction::normalize(&body.action),
        reason: body.reason,
    };

    apply_verdict(&state.db_pool, &verdict).await?;

    Ok(Json(ModerationResultResponse { success: true }))
}
