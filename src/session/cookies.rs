//! Cookie parsing and `Set-Cookie` construction.
//!
//! Only the small subset the gateway needs: reading named values from the
//! `Cookie` header(s) and emitting persistent or expired cookies.

use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};

/// Prefix shared by every cookie the gateway owns.
pub const COOKIE_PREFIX: &str = "shop_";

/// Opaque per-visitor session identifier.
pub const SESSION_COOKIE: &str = "shop_session-id";

/// Whitelisted display currency.
pub const CURRENCY_COOKIE: &str = "shop_currency";

/// Lifetime of both cookies.
pub const COOKIE_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 48);

/// Iterate `(name, value)` pairs across all `Cookie` headers.
pub fn request_cookies(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim(), value.trim().trim_matches('"')))
        })
}

/// Value of the first cookie called `name`, if any.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    request_cookies(headers).find(|(n, _)| *n == name).map(|(_, v)| v)
}

/// A cookie to be written on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    /// Seconds; zero or less expires the cookie immediately.
    pub max_age: i64,
}

impl SetCookie {
    /// A cookie that lives for [`COOKIE_MAX_AGE`].
    pub fn persistent(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: COOKIE_MAX_AGE.as_secs() as i64,
        }
    }

    /// An already-expired cookie, which makes the browser drop `name`.
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            max_age: 0,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.max_age <= 0
    }

    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> Result<HeaderValue, header::InvalidHeaderValue> {
        let mut line = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, self.value, self.max_age
        );
        if self.is_expired() {
            line.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        }
        HeaderValue::from_str(&line)
    }

    /// Append to `headers` without replacing cookies already set.
    pub fn append_to(&self, headers: &mut HeaderMap) {
        match self.header_value() {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(cookie = %self.name, error = %e, "Unencodable cookie dropped"),
        }
    }
}
