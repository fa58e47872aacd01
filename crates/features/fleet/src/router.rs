use crate::handlers;
use taxi_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Index, list and detail routes. All of them require a session.
pub fn fleet_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::index))
        .routes(routes!(handlers::driver_list))
        .routes(routes!(handlers::driver_detail))
        .routes(routes!(handlers::car_list))
        .routes(routes!(handlers::car_detail))
        .routes(routes!(handlers::manufacturer_list))
}
