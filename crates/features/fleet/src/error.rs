use std::borrow::Cow;
use taxi_database::DatabaseError;
use taxi_kernel::listing::ListingError;
use taxi_kernel::pagination::PaginationError;
use taxi_kernel::security::PasswordError;

/// A specialized [`FleetError`] enum of this crate.
#[taxi_derive::taxi_error]
pub enum FleetError {
    /// No record with the requested id.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The `page` parameter does not name an existing page.
    #[error("{source}{}", format_context(.context))]
    InvalidPage { source: PaginationError, context: Option<Cow<'static, str>> },

    /// Database failures, e.g. a fixture violating a unique index.
    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    /// Unreadable or inconsistent fixture document.
    #[error("Fixture error{}: {message}", format_context(.context))]
    Fixtures { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Fixture password error{}: {source}", format_context(.context))]
    Password { source: PasswordError, context: Option<Cow<'static, str>> },

    #[error("Fixture parse error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Fixture read error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The fleet slice is not registered in the API state.
    #[cfg(feature = "server")]
    #[error("Fleet state error{}: {source}", format_context(.context))]
    State {
        source: taxi_kernel::server::ApiStateError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal fleet error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<ListingError> for FleetError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::InvalidPage { source, context } => Self::InvalidPage { source, context },
            ListingError::Database { source, context } => Self::Database { source, context },
        }
    }
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for FleetError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            Self::NotFound { .. } | Self::InvalidPage { .. } => StatusCode::NOT_FOUND,
            _ => {
                tracing::error!(error = %self, "Fleet request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        taxi_kernel::server::error_response(status, self.kind(), self.to_string())
    }
}
