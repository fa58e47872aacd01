//! # Domain Models
//!
//! Pure taxi-fleet types: records, configuration and route constants.
//! Keep it lean: `serde`, `SurrealValue` and the store's `Record` contract, no I/O or heavy logic.

pub mod config;
pub mod constants;
pub mod models;
pub mod registry;
