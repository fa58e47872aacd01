use crate::views::{CarDetailView, DriverDetailView, IndexView};
use crate::{Fleet, FleetError};
use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, RawQuery, State};
use axum::response::IntoResponse;
use taxi_derive::api_handler;
use taxi_domain::constants::FLEET_TAG;
use taxi_domain::models::RecordId;
use taxi_kernel::query::QueryParams;
use taxi_kernel::server::{ApiState, AuthSession, ErrorBody};
use tracing::debug;

fn query_params(raw: Option<&str>) -> QueryParams {
    raw.map(QueryParams::parse).unwrap_or_default()
}

// Non-numeric ids cannot name a record.
fn record_id(path: Result<Path<RecordId>, PathRejection>) -> Result<RecordId, FleetError> {
    path.map(|Path(id)| id).map_err(|rejection| FleetError::NotFound {
        message: rejection.body_text().into(),
        context: None,
    })
}

#[api_handler(
    get,
    path = "/",
    responses(
        (status = OK, description = "Fleet counters and the session visit count", body = IndexView),
        (status = FOUND, description = "Not logged in; redirected to the login page"),
    ),
    tag = FLEET_TAG,
)]
pub(crate) async fn index(
    session: AuthSession,
    State(state): State<ApiState>,
) -> Result<Json<IndexView>, FleetError> {
    let counts = state.try_get_slice::<Fleet>()?.counts().await?;

    Ok(Json(IndexView {
        num_drivers: counts.drivers,
        num_cars: counts.cars,
        num_manufacturers: counts.manufacturers,
        num_visits: session.record_visit(),
    }))
}

#[api_handler(
    get,
    path = "/drivers/",
    params(
        ("username" = Option<String>, Query, description = "Case-insensitive username fragment"),
        ("page" = Option<String>, Query, description = "Page number or `last`"),
    ),
    responses(
        (status = OK, description = "`driver_list`, `search`, `is_paginated` and `page_obj`"),
        (status = FOUND, description = "Not logged in; redirected to the login page"),
        (status = NOT_FOUND, description = "No such page", body = ErrorBody),
    ),
    tag = FLEET_TAG,
)]
pub(crate) async fn driver_list(
    session: AuthSession,
    State(state): State<ApiState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, FleetError> {
    debug!(user_id = session.user_id, "Listing drivers");
    let page = state.try_get_slice::<Fleet>()?.drivers(&query_params(raw.as_deref())).await?;
    Ok(Json(page))
}

#[api_handler(
    get,
    path = "/cars/",
    params(
        ("model" = Option<String>, Query, description = "Case-insensitive model fragment"),
        ("page" = Option<String>, Query, description = "Page number or `last`"),
    ),
    responses(
        (status = OK, description = "`car_list`, `search`, `is_paginated` and `page_obj`"),
        (status = FOUND, description = "Not logged in; redirected to the login page"),
        (status = NOT_FOUND, description = "No such page", body = ErrorBody),
    ),
    tag = FLEET_TAG,
)]
pub(crate) async fn car_list(
    session: AuthSession,
    State(state): State<ApiState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, FleetError> {
    debug!(user_id = session.user_id, "Listing cars");
    let page = state.try_get_slice::<Fleet>()?.cars(&query_params(raw.as_deref())).await?;
    Ok(Json(page))
}

#[api_handler(
    get,
    path = "/manufacturers/",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name fragment"),
        ("page" = Option<String>, Query, description = "Page number or `last`"),
    ),
    responses(
        (status = OK, description = "`manufacturer_list`, `search`, `is_paginated` and `page_obj`"),
        (status = FOUND, description = "Not logged in; redirected to the login page"),
        (status = NOT_FOUND, description = "No such page", body = ErrorBody),
    ),
    tag = FLEET_TAG,
)]
pub(crate) async fn manufacturer_list(
    session: AuthSession,
    State(state): State<ApiState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, FleetError> {
    debug!(user_id = session.user_id, "Listing manufacturers");
    let page = state.try_get_slice::<Fleet>()?.manufacturers(&query_params(raw.as_deref())).await?;
    Ok(Json(page))
}

#[api_handler(
    get,
    path = "/drivers/{id}/",
    params(("id" = u64, Path, description = "Driver id")),
    responses(
        (status = OK, description = "Driver with assigned cars", body = DriverDetailView),
        (status = FOUND, description = "Not logged in; redirected to the login page"),
        (status = NOT_FOUND, description = "No such driver", body = ErrorBody),
    ),
    tag = FLEET_TAG,
)]
pub(crate) async fn driver_detail(
    _session: AuthSession,
    State(state): State<ApiState>,
    path: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<DriverDetailView>, FleetError> {
    let id = record_id(path)?;
    Ok(Json(state.try_get_slice::<Fleet>()?.driver_detail(id).await?))
}

#[api_handler(
    get,
    path = "/cars/{id}/",
    params(("id" = u64, Path, description = "Car id")),
    responses(
        (status = OK, description = "Car with manufacturer and drivers", body = CarDetailView),
        (status = FOUND, description = "Not logged in; redirected to the login page"),
        (status = NOT_FOUND, description = "No such car", body = ErrorBody),
    ),
    tag = FLEET_TAG,
)]
pub(crate) async fn car_detail(
    _session: AuthSession,
    State(state): State<ApiState>,
    path: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<CarDetailView>, FleetError> {
    let id = record_id(path)?;
    Ok(Json(state.try_get_slice::<Fleet>()?.car_detail(id).await?))
}
