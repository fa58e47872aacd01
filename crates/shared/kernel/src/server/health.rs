use super::state::ApiState;
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use std::sync::LazyLock;
use std::time::Instant;
use taxi_derive::{api_handler, api_model};
use taxi_domain::constants::SYSTEM_TAG;
use tracing::warn;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_model]
/// Liveness of the service and its database.
struct HealthResponse {
    /// `up`, or `degraded` when the database does not answer
    status: &'static str,
    version: &'static str,
    /// Seconds since the first health check
    uptime: u64,
    /// `<namespace>/<database>`
    database: String,
    /// Registered feature slices
    slices: Vec<String>,
}

#[api_handler(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service and database are up", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "Database unreachable", body = HealthResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let (status, label) = match state.database.health().await {
        Ok(()) => (StatusCode::OK, "up"),
        Err(err) => {
            warn!(error = %err, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    let body = HealthResponse {
        status: label,
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
        database: format!("{}/{}", state.database.namespace(), state.database.name()),
        slices: state.slice_names().into_iter().map(str::to_owned).collect(),
    };

    (status, [(header::CACHE_CONTROL, "no-store"), (header::PRAGMA, "no-cache")], Json(body))
}
