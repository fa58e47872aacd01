//! Glob-importable set of the types most slices need.

pub use crate::listing::{ListPage, ListView, ListingError, PageInfo};
pub use crate::pagination::{Page, PaginationError, Paginator};
pub use crate::query::{QueryOverrides, QueryParams, query_transform};
pub use crate::safe_nanoid;
pub use crate::security::{PasswordError, Session, SessionStore, hash_password, verify_password};
pub use taxi_database::{Database, Lookup, Table};
pub use taxi_domain::config::ApiConfig;
pub use taxi_domain::models::{Car, Driver, Manufacturer, Record, RecordId};
pub use taxi_domain::registry::{FeatureSlice, InitializedSlice};

#[cfg(feature = "server")]
pub use crate::server::{AccessDenied, ApiState, AuthSession, error_response};
