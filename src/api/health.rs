//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;
use crate::infrastructure::services::IndexOverview;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but a rebuild is replacing the active snapshot
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            Self::Healthy | Self::Degraded => StatusCode::OK,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexProbe>,
}

/// What readiness knows about the index being served
#[derive(Debug, Serialize)]
pub struct IndexProbe {
    pub snapshot_version: u64,
    pub chunks: usize,
    pub building: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl IndexProbe {
    fn from_overview(overview: &IndexOverview) -> (HealthStatus, Self) {
        let (status, message) = if !overview.status.loaded {
            (HealthStatus::Unhealthy, Some("no index snapshot loaded"))
        } else if overview.building {
            (HealthStatus::Degraded, Some("rebuild in progress"))
        } else {
            (HealthStatus::Healthy, None)
        };

        let probe = Self {
            snapshot_version: overview.status.info.version,
            chunks: overview.status.info.entries,
            building: overview.building,
            message,
        };

        (status, probe)
    }
}

/// The process is up
pub async fn health_check() -> impl IntoResponse {
    let body = HealthBody {
        status: HealthStatus::Healthy,
        version: VERSION,
        index: None,
    };

    (StatusCode::OK, Json(body))
}

/// Questions can be answered from a loaded snapshot
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, probe) = IndexProbe::from_overview(&state.index_service.overview());

    let body = HealthBody {
        status,
        version: VERSION,
        index: Some(probe),
    };

    (status.status_code(), Json(body))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
