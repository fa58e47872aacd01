#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the taxi service crates: error enums, feature slices,
//! API models/handlers and the runtime entry point.
//!
//! Examples are `ignore`d here because they need the consuming crates in scope.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the specialized Tokio runtime.
///
/// Turns an `async fn main` into a plain `fn main` that builds a runtime from one of the
/// `taxi_runtime::RuntimeConfig` presets.
///
/// # Arguments
///
/// * `server` - The HTTP server profile.
/// * `default` (or no argument) - Worker threads detected from available parallelism.
///
/// # Examples
///
/// ```rust,ignore
/// #[taxi_runtime::main(server)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines an API data model.
///
/// * Adds `Debug`, `Serialize` and `Deserialize` when missing.
/// * Adds `utoipa::ToSchema` when the consuming crate's `server` feature is enabled.
/// * Applies `rename_all = "snake_case"` (override with `rename_all = "..."`) and
///   `deny_unknown_fields` (disable with `deny_unknown_fields = false`).
///
/// ```rust,ignore
/// #[taxi_derive::api_model]
/// pub struct DriverView {
///     pub id: u64,
///     pub username: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Bridges an Axum handler with `utoipa::path` documentation.
///
/// Accepts the usual `utoipa::path` arguments (`get`, `path = "..."`, `params(...)`,
/// `responses(...)`, `tag = ...`).
///
/// ```rust,ignore
/// #[taxi_derive::api_handler(get, path = "/health", responses((status = OK)), tag = SYSTEM_TAG)]
/// pub async fn health_handler() -> impl IntoResponse { "up" }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Defines a crate error enum.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<Name>Ext` trait with `.context(...)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant that wraps a source error.
/// * `From<Source>` for those variants, so `?` works on upstream errors.
/// * `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * `kind()` returning the variant name.
///
/// # Requirements
///
/// Variants use named fields. A variant with a `source` (or `#[source]`/`#[from]`) field
/// must also carry `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[taxi_derive::taxi_error]
/// pub enum DatabaseError {
///     #[error("Conflict{}: {message}", format_context(.context))]
///     Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///     #[error("Internal database error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn taxi_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Defines a feature slice handle.
///
/// Generates `<Name>Inner` holding the fields, an `Arc`-backed `<Name>` handle with
/// `Deref` to the inner state, a `NAME` constant (from `name = "..."` or the lowercased
/// struct name) and the kernel's `FeatureSlice` impl.
///
/// ```rust,ignore
/// #[taxi_derive::taxi_slice(name = "fleet")]
/// pub struct Fleet {
///     pub page_size: usize,
/// }
///
/// let fleet = Fleet::new(FleetInner { page_size: 5 });
/// ```
#[proc_macro_attribute]
pub fn taxi_slice(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(args.into(), input).into()
}
