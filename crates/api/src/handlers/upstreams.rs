use axum::{extract::State, Json};
use ferrous_relay_application::ports::UpstreamStatus;

use crate::state::AdminState;

/// Every configured upstream in pool/server order.
pub async fn get_upstreams(State(state): State<AdminState>) -> Json<Vec<UpstreamStatus>> {
    Json(state.upstreams.upstream_statuses())
}
