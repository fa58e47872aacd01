use axum::Router;
use taxi::kernel::prelude::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

/// Path of the interactive API reference.
const DOCS_PATH: &str = "/api";

#[derive(OpenApi)]
#[openapi(info(
    title = "Taxi Service",
    description = "Drivers, cars and manufacturers of a taxi fleet"
))]
struct TaxiApi;

/// System and feature routes, traced, plus the API reference built from their annotations.
pub(crate) fn init(state: ApiState) -> Router {
    let (routes, openapi) = OpenApiRouter::with_openapi(TaxiApi::openapi())
        .merge(taxi::server::router::system_router())
        .merge(taxi::server::router::feature_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    routes.merge(Scalar::with_url(DOCS_PATH, openapi))
}
