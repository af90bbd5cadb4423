use super::state::AppState;
use crate::avatar::StartAvatarRequest;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Start with voice chat enabled (default: true)
    #[serde(default = "default_voice")]
    pub voice: bool,
}

fn default_voice() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct SessionActionResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Start a new avatar session
pub async fn start_session(
    State(state): State<AppState>,
    payload: Option<Json<StartSessionRequest>>,
) -> impl IntoResponse {
    let voice = payload.map(|Json(req)| req.voice).unwrap_or(true);
    info!("Session start requested (voice={})", voice);

    match state.controller.start_session(voice).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "started".to_string(),
                message: "Session start initiated".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start session: {e:#}");
            // Blocked media is a retryable user-facing condition, not a
            // backend fault
            let code = if state.controller.media_blocked() {
                StatusCode::CONFLICT
            } else {
                StatusCode::BAD_GATEWAY
            };
            (
                code,
                Json(ErrorResponse {
                    error: format!("{e:#}"),
                }),
            )
                .into_response()
        }
    }
}

/// POST /session/stop
/// Manually stop and finalize the session
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Manual session stop requested");

    match state.controller.stop_session().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "stopped".to_string(),
                message: "Session finalized".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to stop session: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("{e:#}"),
                }),
            )
                .into_response()
        }
    }
}

/// POST /session/retry
/// Retry after a blocked-media prompt
pub async fn retry_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Media-blocked retry requested");

    match state.controller.retry_after_block().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "retrying".to_string(),
                message: "Retry initiated".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Retry failed: {e:#}");
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("{e:#}"),
                }),
            )
                .into_response()
        }
    }
}

/// PUT /session/config
/// Replace the avatar configuration (only allowed while inactive)
pub async fn update_avatar_config(
    State(state): State<AppState>,
    Json(request): Json<StartAvatarRequest>,
) -> impl IntoResponse {
    match state.controller.set_avatar_config(request).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "updated".to_string(),
                message: "Avatar configuration updated".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("{e:#}"),
            }),
        )
            .into_response(),
    }
}

/// GET /session/status
/// Snapshot of session state, flags and counters
pub async fn get_session_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.controller.status().await;
    (StatusCode::OK, Json(status)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
