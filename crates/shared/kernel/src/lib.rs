//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it holds the query-string helpers, the generic list view,
//! sessions and password hashing, config loading and (behind `server`) the API state.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use taxi_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Query strings
//! ```rust
//! use taxi_kernel::query::{QueryOverrides, QueryParams, query_transform};
//!
//! let current = QueryParams::parse("?username=an&page=2");
//! let link = query_transform(&current, &QueryOverrides::new().set("page", 3));
//! assert_eq!(link, "username=an&page=3");
//! ```
pub mod config;
pub mod listing;
pub mod pagination;
pub mod prelude;
pub mod query;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use nanoid::nanoid;
pub use taxi_database as database;
pub use taxi_domain as domain;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
