//! Route paths, query parameter names and `OpenAPI` tags shared across slices.

pub const SYSTEM_TAG: &str = "System";
pub const FLEET_TAG: &str = "Fleet";
pub const IDENTITY_TAG: &str = "Identity";

pub const INDEX: &str = "/";
pub const DRIVER_LIST: &str = "/drivers/";
pub const DRIVER_DETAIL: &str = "/drivers/{id}/";
pub const CAR_LIST: &str = "/cars/";
pub const CAR_DETAIL: &str = "/cars/{id}/";
pub const MANUFACTURER_LIST: &str = "/manufacturers/";
pub const LOGIN: &str = "/accounts/login/";
pub const LOGOUT: &str = "/accounts/logout/";

/// Query parameter carrying the page number of a paginated list.
pub const PAGE_PARAM: &str = "page";
/// Query parameter carrying the post-login redirect target.
pub const NEXT_PARAM: &str = "next";
