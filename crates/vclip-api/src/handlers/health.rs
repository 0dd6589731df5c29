//! Health and version handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub storage: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
        }
    }
}

/// `GET /healthz`: liveness plus a connectivity check against remote
/// storage, since a dead bucket means every job will fail at fetch/upload.
pub async fn healthz(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage = match state.storage.check_connectivity().await {
        Ok(()) => CheckStatus::ok(),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let response = HealthResponse {
        status: if storage.status == "ok" { "ok" } else { "degraded" }.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        storage,
    };

    if response.status == "ok" {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
}

/// `GET /version`.
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
