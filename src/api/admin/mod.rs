//! Admin API endpoints for operating the index

pub mod index;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/index", get(index::get_index_status))
        .route("/index/rebuild", post(index::rebuild_index))
}
