//! Argon2id password hashes stored as PHC strings (`$argon2id$v=19$m=...$<salt>$<hash>`).

use crate::safe_nanoid;
use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::borrow::Cow;

const SALT_LENGTH: usize = 16;

#[taxi_derive::taxi_error]
pub enum PasswordError {
    #[error("Password hashing failed{}: {source}", format_context(.context))]
    Hash { source: password_hash::Error, context: Option<Cow<'static, str>> },
}

/// Hashes `password` with a fresh random salt.
///
/// # Errors
/// [`PasswordError::Hash`] if argon2 rejects the input (e.g. a password past its length limit).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::encode_b64(safe_nanoid!(SALT_LENGTH).as_bytes())?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(hash.to_string())
}

/// Checks `password` against a PHC hash. Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, encoded: &str) -> bool {
    PasswordHash::new(encoded)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
