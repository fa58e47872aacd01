//! Facade crate for the taxi service features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `taxi` with the `server` feature.
//! - Call [`init`] to build the feature slices, then mount [`server::router::feature_router`].

use std::borrow::Cow;
use taxi_database::Database;
pub use taxi_domain as domain;
use taxi_domain::config::ApiConfig;
pub use taxi_kernel as kernel;
use tracing::info;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use taxi_kernel::server::router::system_router;
        use taxi_kernel::server::ApiState;
        use utoipa_axum::router::OpenApiRouter;

        /// Routes of every enabled feature slice.
        #[must_use]
        pub fn feature_router() -> OpenApiRouter<ApiState> {
            OpenApiRouter::new()
                .merge(crate::features::fleet::router::fleet_router())
                .merge(crate::features::identity::router::identity_router())
        }
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use taxi_fleet as fleet;
    pub use taxi_identity as identity;

    /// Slice names, in initialization order.
    pub const ENABLED: &[&str] = &[fleet::Fleet::NAME, identity::Identity::NAME];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

#[taxi_derive::taxi_error]
pub enum BootstrapError {
    #[error("Fleet bootstrap failed{}: {source}", format_context(.context))]
    Fleet { source: taxi_fleet::FleetError, context: Option<Cow<'static, str>> },
    #[error("Identity bootstrap failed{}: {source}", format_context(.context))]
    Identity { source: taxi_identity::IdentityError, context: Option<Cow<'static, str>> },
}

/// Loads the configured fixtures (if any) and initializes every feature slice.
///
/// # Errors
/// Returns an error if the fixture document cannot be loaded or a slice fails to initialize.
pub async fn init(
    config: &ApiConfig,
    database: &Database,
) -> Result<Vec<domain::registry::InitializedSlice>, BootstrapError> {
    if let Some(path) = &config.database.fixtures {
        let fixtures = features::fleet::Fixtures::from_path(path)?;
        fixtures.load(database).await.context("Loading fixtures")?;
    }

    let slices = vec![
        features::fleet::init(&config.listing, database).await?,
        features::identity::init(database).await?,
    ];
    info!(slices = slices.len(), "Feature slices initialized");

    Ok(slices)
}
