use axum::{extract::State, http::header, response::IntoResponse};
use tracing::instrument;

use crate::{errors::ApiError, state::AdminState};

/// Prometheus text exposition format, version 0.0.4.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[instrument(skip(state), name = "api_get_metrics")]
pub async fn get_metrics(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.export()?;
    Ok(([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body))
}
