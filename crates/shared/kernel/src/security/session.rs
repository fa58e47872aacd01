//! In-memory login sessions keyed by an opaque cookie value.

use crate::safe_nanoid;
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use taxi_domain::config::SessionConfig;
use taxi_domain::models::RecordId;
use tracing::{debug, info};

const SESSION_ID_LENGTH: usize = 32;

/// An authenticated login. Clones share the visit counter.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Arc<str>,
    pub user_id: RecordId,
    pub username: Arc<str>,
    visits: Arc<AtomicU64>,
}

impl Session {
    #[must_use]
    pub fn visits(&self) -> u64 {
        self.visits.load(Ordering::Relaxed)
    }

    /// Bumps the visit counter and returns the new value.
    pub fn record_visit(&self) -> u64 {
        self.visits.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Bounded session cache. Entries expire after `ttl_seconds` without a lookup.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<Arc<str>, Session>,
    config: Arc<SessionConfig>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("cookie_name", &self.config.cookie_name)
            .field("ttl_seconds", &self.config.ttl_seconds)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_idle(Duration::from_secs(config.ttl_seconds.max(1)))
            .build();
        info!(
            cookie = %config.cookie_name,
            ttl_seconds = config.ttl_seconds,
            capacity = config.capacity,
            "Session store ready"
        );
        Self { cache, config: Arc::new(config.clone()) }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Starts a session for `user_id`.
    pub fn create(&self, user_id: RecordId, username: &str) -> Session {
        let session = Session {
            id: Arc::from(safe_nanoid!(SESSION_ID_LENGTH)),
            user_id,
            username: Arc::from(username),
            visits: Arc::default(),
        };
        self.cache.insert(Arc::clone(&session.id), session.clone());
        debug!(user_id, username, "Session created");
        session
    }

    /// Looks up a live session. A hit refreshes its idle timer.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        self.cache.get(id)
    }

    #[must_use]
    pub fn is_authenticated(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ends a session. Unknown ids are ignored.
    pub fn revoke(&self, id: &str) {
        if self.cache.remove(id).is_some() {
            debug!("Session revoked");
        }
    }

    /// `Set-Cookie` value carrying `session_id`.
    #[must_use]
    pub fn session_cookie(&self, session_id: &str) -> String {
        self.cookie(session_id, self.config.ttl_seconds)
    }

    /// `Set-Cookie` value that makes the browser drop the session cookie.
    #[must_use]
    pub fn expired_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: u64) -> String {
        let secure = if self.config.secure { "; Secure" } else { "" };
        format!(
            "{}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax{secure}",
            self.config.cookie_name
        )
    }
}

/// Value of cookie `name` in a `Cookie` request header.
#[must_use]
pub fn cookie_value<'h>(header: &'h str, name: &str) -> Option<&'h str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig::default())
    }

    #[test]
    fn create_then_get() {
        let store = store();
        let session = store.create(7, "anton");
        assert_eq!(session.id.len(), SESSION_ID_LENGTH);
        assert!(session.id.chars().all(|ch| crate::SAFE_ALPHABET.contains(&ch)), "{}", session.id);
        assert_ne!(store.create(7, "anton").id, session.id);

        let found = store.get(&session.id).expect("session is live");
        assert_eq!(found.user_id, 7);
        assert_eq!(&*found.username, "anton");
        assert!(store.is_authenticated(&session.id));
        assert!(!store.is_authenticated("nope"));
    }

    #[test]
    fn revoke_ends_the_session() {
        let store = store();
        let session = store.create(1, "peter");
        store.revoke(&session.id);
        assert!(store.get(&session.id).is_none());
    }

    #[test]
    fn visits_are_shared_between_lookups() {
        let store = store();
        let session = store.create(1, "andrew");
        assert_eq!(store.get(&session.id).map(|s| s.record_visit()), Some(1));
        assert_eq!(store.get(&session.id).map(|s| s.record_visit()), Some(2));
        assert_eq!(session.visits(), 2);
    }

    #[test]
    fn cookie_attributes() {
        let store = SessionStore::new(&SessionConfig { secure: true, ..SessionConfig::default() });

        let cookie = store.session_cookie("abc");
        assert!(cookie.starts_with("sessionid=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.ends_with("; Secure"));
        assert!(store.expired_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn cookie_value_picks_the_named_cookie() {
        let header = "csrftoken=x; sessionid=abc123 ; theme=dark";
        assert_eq!(cookie_value(header, "sessionid"), Some("abc123"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
        assert_eq!(cookie_value(header, "missing"), None);
    }
}
