use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default config file stem, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "server";

/// Custom error type for config loading.
#[taxi_derive::taxi_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads settings from a file and overlays environment overrides.
///
/// 1. **Base file**: `path` if given (it must then exist), otherwise an optional `server.*`
///    file in the working directory. Any format the `config` crate understands works.
/// 2. **Environment**: variables prefixed with `TAXI__`; nested keys are separated by double
///    underscores (`TAXI__LISTING__PAGE_SIZE=10` maps to `listing.page_size`).
///
/// Anything left unset falls back to the target type's serde defaults.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicitly requested file is missing or the merged
/// settings do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use taxi_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    if required {
        info!("Loading config from {}", effective_path.display());
    } else {
        warn!(
            "No config path given, trying optional '{}' with environment overrides",
            effective_path.display()
        );
    }

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix("TAXI")
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
