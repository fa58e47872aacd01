//! Password hashing and cookie-backed login sessions.

pub mod password;
pub mod session;

pub use password::{PasswordError, PasswordErrorExt, hash_password, verify_password};
pub use session::{Session, SessionStore, cookie_value};
