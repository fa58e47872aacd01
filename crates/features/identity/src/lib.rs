//! Identity feature slice: password login for drivers and cookie sessions.
//!
//! Drivers are the accounts. [`Identity::authenticate`] checks a username and password
//! against the stored hash; the HTTP handlers (behind `server`) turn a successful check into
//! a session from the kernel's session store.

mod error;
#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub mod router;

pub use crate::error::{IdentityError, IdentityErrorExt};

use taxi_database::{Database, Lookup, Table};
use taxi_domain::models::Driver;
use taxi_kernel::domain::registry::InitializedSlice;
use taxi_kernel::security::verify_password;
use tracing::{debug, info};

// Checked against when the username is unknown so both failure paths hash once.
// Uses the default argon2 parameters so the unknown-user path costs the same.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$CPmul8F18RMpR3P7wVl6tQ$CRpsVGjF6fSxDfE3GPIytAPUVXg8QE5uSysXkKzhDuc";

/// Identity feature state
#[taxi_derive::taxi_slice(name = "identity")]
pub struct Identity {
    drivers: Table<Driver>,
}

impl Identity {
    /// Returns the driver whose username and password match.
    ///
    /// # Errors
    /// * [`IdentityError::InvalidCredentials`] for an unknown username, a driver without a
    ///   password or a wrong password.
    /// * [`IdentityError::Database`] if the lookup fails.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Driver, IdentityError> {
        let driver = self.drivers.find_one(&Lookup::exact("username", username)).await?;

        let hash =
            driver.as_ref().and_then(|d| d.password_hash.as_deref()).unwrap_or(UNKNOWN_USER_HASH);
        let verified = verify_password(password, hash);

        match driver {
            Some(driver) if verified && driver.password_hash.is_some() => {
                debug!(user_id = driver.id, "Driver authenticated");
                Ok(driver)
            }
            _ => {
                debug!(username, "Authentication failed");
                Err(IdentityError::InvalidCredentials {
                    message: "Please enter a correct username and password".into(),
                    context: None,
                })
            }
        }
    }
}

/// Initialize the identity feature.
///
/// # Errors
/// [`IdentityError::Database`] if the driver table cannot be defined.
pub async fn init(database: &Database) -> Result<InitializedSlice, IdentityError> {
    let drivers = database.define::<Driver>().await.context("Identity tables")?;
    let slice = Identity::new(IdentityInner { drivers });
    info!(slice = Identity::NAME, "Identity slice initialized");

    Ok(InitializedSlice::new(slice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_kernel::security::hash_password;

    async fn identity() -> Identity {
        let db =
            Database::builder().url("mem://").session("taxi", "identity").init().await.unwrap();
        let drivers = db.define::<Driver>().await.unwrap();
        let hash = hash_password("1qazcde3").unwrap();
        drivers.insert(Driver::new("anton", "ANT12345").with_password_hash(hash)).await.unwrap();
        drivers.insert(Driver::new("nopass", "NOP12345")).await.unwrap();
        Identity::new(IdentityInner { drivers })
    }

    #[tokio::test]
    async fn correct_password_authenticates() {
        let driver = identity().await.authenticate("anton", "1qazcde3").await.unwrap();
        assert_eq!(driver.username, "anton");
    }

    #[tokio::test]
    async fn failures_look_the_same() {
        let identity = identity().await;
        let wrong_password = identity.authenticate("anton", "nope").await.unwrap_err();
        let unknown_user = identity.authenticate("boris", "1qazcde3").await.unwrap_err();
        let no_password = identity.authenticate("nopass", "").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(no_password.kind(), "InvalidCredentials");
    }

    #[test]
    fn unknown_user_hash_is_a_valid_argon2_hash() {
        let parsed = argon2::password_hash::PasswordHash::new(UNKNOWN_USER_HASH).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(!verify_password("", UNKNOWN_USER_HASH));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        assert!(identity().await.authenticate("Anton", "1qazcde3").await.is_err());
    }
}
