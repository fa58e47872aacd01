use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[taxi_derive::taxi_error]
pub enum DatabaseError {
    /// Builder validation errors.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when the engine does not start or stays unhealthy.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A `UNIQUE` index already holds the value being written.
    #[error("Unique constraint violated{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The record addressed by id does not exist.
    #[error("Record not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl DatabaseError {
    /// Classifies a failed write: unique index violations become [`DatabaseError::Conflict`].
    pub(crate) fn from_write(
        source: surrealdb::Error,
        context: impl Into<Cow<'static, str>>,
    ) -> Self {
        let message = source.to_string();
        if message.contains("already contains") {
            Self::Conflict { message: message.into(), context: Some(context.into()) }
        } else {
            Self::Surreal { source, context: Some(context.into()) }
        }
    }
}
