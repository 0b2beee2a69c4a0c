//! Index status and rebuild endpoints

use axum::extract::State;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::DomainError;
use crate::infrastructure::index::BuildReport;
use crate::infrastructure::services::IndexOverview;

/// GET /admin/index
pub async fn get_index_status(State(state): State<AppState>) -> Json<IndexOverview> {
    Json(state.index_service.overview())
}

/// POST /admin/index/rebuild
///
/// Runs the build to completion; the previous snapshot keeps serving
/// queries until the new one is published. 409 while another build runs.
pub async fn rebuild_index(
    State(state): State<AppState>,
) -> Result<Json<BuildReport>, ApiError> {
    info!("Index rebuild requested");

    match state.index_service.rebuild().await {
        Ok(report) => Ok(Json(report)),
        Err(e @ DomainError::Conflict { .. }) => {
            info!("Rebuild rejected, a build is already running");
            Err(e.into())
        }
        Err(e) => {
            warn!(error = %e, "Index rebuild failed");
            Err(e.into())
        }
    }
}
