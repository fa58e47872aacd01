//! Session authentication for handlers.
//!
//! Handlers that need a logged-in driver take an [`AuthSession`] argument. Requests without
//! a live session cookie are rejected with [`AccessDenied`], a redirect to the login page
//! carrying the original path in `next`; the handler body never runs.

use crate::query::QueryParams;
use crate::security::{Session, SessionStore, cookie_value};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::ops::Deref;
use taxi_domain::constants::{LOGIN, NEXT_PARAM};
use tracing::debug;

/// The caller's live session.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl AuthSession {
    /// Resolves the session cookie in `headers` against `store`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, store: &SessionStore) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| cookie_value(value, store.cookie_name()))
            .and_then(|id| store.get(id))
            .map(Self)
    }
}

impl Deref for AuthSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = AccessDenied;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_ref(state);
        Self::from_headers(&parts.headers, &store).ok_or_else(|| {
            let next = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
            debug!(path = %parts.uri.path(), "Unauthenticated request redirected to login");
            AccessDenied::new(next)
        })
    }
}

/// Rejection for protected endpoints hit without a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    next: String,
}

impl AccessDenied {
    pub fn new(next: impl Into<String>) -> Self {
        Self { next: next.into() }
    }

    /// Where the client is sent: the login page with `next` set.
    #[must_use]
    pub fn location(&self) -> String {
        login_redirect(&self.next)
    }
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location())]).into_response()
    }
}

/// `/accounts/login/?next=<next>`.
#[must_use]
pub fn login_redirect(next: &str) -> String {
    let query: QueryParams = [(NEXT_PARAM, next)].into_iter().collect();
    format!("{LOGIN}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use taxi_domain::config::SessionConfig;

    #[test]
    fn login_redirect_encodes_next() {
        assert_eq!(login_redirect("/cars/?model=Model S"), "/accounts/login/?next=%2Fcars%2F%3Fmodel%3DModel+S");
    }

    #[test]
    fn session_is_found_in_any_cookie_header() {
        let store = SessionStore::new(&SessionConfig::default());
        let session = store.create(3, "peter");

        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        let cookie = format!("sessionid={}", session.id);
        headers.append(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        let auth = AuthSession::from_headers(&headers, &store).expect("authenticated");
        assert_eq!(auth.user_id, 3);
    }

    #[test]
    fn unknown_session_is_rejected() {
        let store = SessionStore::new(&SessionConfig::default());
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid=forged"));
        assert!(AuthSession::from_headers(&headers, &store).is_none());
    }
}
