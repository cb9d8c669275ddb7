use crate::handlers;
use crate::state::AdminState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub fn create_admin_routes(state: AdminState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/metrics", get(handlers::get_metrics))
        .route("/upstreams", get(handlers::get_upstreams))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
