use crate::handlers;
use taxi_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Login and logout routes.
pub fn identity_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handlers::login)).routes(routes!(handlers::logout))
}
