use crate::{Identity, IdentityError};
use axum::Form;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use taxi_derive::{api_handler, api_model};
use taxi_domain::constants::{IDENTITY_TAG, INDEX, LOGIN};
use taxi_kernel::server::{ApiState, AuthSession, ErrorBody};
use tracing::info;

/// Login form. Extra fields (e.g. a CSRF token) are ignored.
#[api_model(deny_unknown_fields = false)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
    /// Local path to continue to after logging in.
    #[serde(default)]
    next: Option<String>,
}

#[api_handler(
    post,
    path = "/accounts/login/",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = FOUND, description = "Logged in; session cookie set and redirected to `next`"),
        (status = UNAUTHORIZED, description = "Wrong username or password", body = ErrorBody),
    ),
    tag = IDENTITY_TAG,
)]
pub(crate) async fn login(
    State(state): State<ApiState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, IdentityError> {
    let identity = state.try_get_slice::<Identity>()?;
    let driver = identity.authenticate(&form.username, &form.password).await?;

    let target = form.next.as_deref().filter(|next| is_local_path(next)).unwrap_or(INDEX);
    let session = state.sessions.create(driver.id, &driver.username);
    info!(user_id = driver.id, target, "Driver logged in");

    Ok((
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, state.sessions.session_cookie(&session.id)),
            (header::LOCATION, target.to_owned()),
        ],
    )
        .into_response())
}

#[api_handler(
    post,
    path = "/accounts/logout/",
    responses((status = FOUND, description = "Session ended; redirected to the login page")),
    tag = IDENTITY_TAG,
)]
pub(crate) async fn logout(State(state): State<ApiState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session) = AuthSession::from_headers(&headers, &state.sessions) {
        state.sessions.revoke(&session.id);
        info!(user_id = session.user_id, "Driver logged out");
    }

    (
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, state.sessions.expired_cookie()),
            (header::LOCATION, LOGIN.to_owned()),
        ],
    )
}

/// Only same-site absolute paths that fit in a `Location` header are followed after login.
fn is_local_path(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.contains(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::is_local_path;

    #[test]
    fn open_redirects_are_refused() {
        assert!(is_local_path("/cars/?model=Model"));
        assert!(!is_local_path("https://evil.example/"));
        assert!(!is_local_path("//evil.example/"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path(""));
        assert!(!is_local_path("/cars/\n"));
        assert!(!is_local_path("/cars/\r\nSet-Cookie: x=1"));
    }
}
