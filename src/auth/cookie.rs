//! Reads and writes the private cookie that holds the session [Token].

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::token::Token, employee::EmployeeId};

/// The name of the cookie holding the serialized session token.
pub(crate) const COOKIE_TOKEN: &str = "token";
/// How long a session lasts without activity.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);
/// How long a session lasts when the employee ticks "remember me".
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Add an auth cookie for `employee_id` to the cookie jar that expires
/// `duration` from now.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the expiry overflows or the token cannot
/// be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    employee_id: EmployeeId,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidToken("expiry is out of range".to_owned()))?;

    set_auth_cookie_expiry(
        jar,
        Token {
            employee_id,
            expires_at,
        },
    )
}

fn set_auth_cookie_expiry(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let value =
        serde_json::to_string(&token).map_err(|error| Error::InvalidToken(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, value))
            .expires(token.expires_at)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Replace the auth cookie with one that has already expired, which logs the
/// employee out on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the session token from the cookie jar.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if there is no auth cookie, and
/// [Error::InvalidToken] if the token cannot be parsed or has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::InvalidToken(error.to_string()))?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidToken("token has expired".to_owned()));
    }

    Ok(token)
}

/// Push the expiry of the auth cookie back to `duration` from now, unless it
/// already expires later than that (e.g. a "remember me" session).
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidToken("expiry is out of range".to_owned()))?;

    if new_expiry <= token.expires_at {
        return Ok(jar);
    }

    set_auth_cookie_expiry(
        jar,
        Token {
            employee_id: token.employee_id,
            expires_at: new_expiry,
        },
    )
}
