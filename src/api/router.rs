use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::middleware::metrics_middleware;
use super::state::AppState;
use super::v1;
use crate::infrastructure::observability::create_metrics_router;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/v1", v1::create_v1_router())
        .nest("/admin", admin::create_admin_router())
        .with_state(state);

    let router = match metrics {
        Some(metrics) => router
            .merge(create_metrics_router(metrics))
            .layer(middleware::from_fn(metrics_middleware)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}
