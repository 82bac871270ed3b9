//! Authentication middleware that validates the session cookie, extends
//! sessions, and redirects anonymous requests to the log-in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session stays alive after the most recent request.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };

    let employee_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.employee_id,
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri);
            return get_redirect(&log_in_redirect_url);
        }
    };

    parts.extensions.insert(employee_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let (mut parts, body) = response.into_parts();
    // The handler may have replaced the cookie (e.g. log out), so only extend
    // the session if it did not touch it.
    if !parts.headers.contains_key(SET_COOKIE) {
        match extend_auth_cookie_duration_if_needed(jar, state.cookie_duration) {
            Ok(jar) => {
                for value in jar.into_response().headers().get_all(SET_COOKIE) {
                    parts.headers.append(SET_COOKIE, value.to_owned());
                }
            }
            Err(error) => tracing::error!("Could not extend session: {error}"),
        }
    }

    Response::from_parts(parts, body)
}

/// Middleware that only lets requests with a valid session through.
///
/// Handlers behind it can take `Extension(employee_id): Extension<EmployeeId>`
/// to find out who is logged in. Anonymous requests are redirected to the
/// log-in page, which sends the employee back here afterwards.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Like [auth_guard], but for HTMX endpoints: the redirect to the log-in
/// page is sent as an `HX-Redirect` header.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
