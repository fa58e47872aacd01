use std::borrow::Cow;
use taxi_database::DatabaseError;

/// A specialized [`IdentityError`] enum of this crate.
#[taxi_derive::taxi_error]
pub enum IdentityError {
    /// Unknown username or wrong password; callers cannot tell which.
    #[error("Invalid credentials{}: {message}", format_context(.context))]
    InvalidCredentials { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// The driver lookup failed.
    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
    /// The identity slice is not registered in the API state.
    #[cfg(feature = "server")]
    #[error("Identity state error{}: {source}", format_context(.context))]
    State {
        source: taxi_kernel::server::ApiStateError,
        context: Option<Cow<'static, str>>,
    },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for IdentityError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            Self::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Self::Database { .. } | Self::State { .. } | Self::Internal { .. } => {
                tracing::error!(error = %self, "Identity request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        taxi_kernel::server::error_response(status, self.kind(), self.to_string())
    }
}
