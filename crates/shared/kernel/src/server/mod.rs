//! Axum building blocks shared by the feature slices.

pub mod auth;
pub mod error;
mod health;
pub mod router;
pub mod state;

pub use auth::{AccessDenied, AuthSession, login_redirect};
pub use error::{ErrorBody, error_response};
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
