//! Display currency selection.
//!
//! # Data Flow
//! ```text
//! POST /setCurrency (form: currency=EUR)
//!     → CurrencyCode::parse (whitelist check)
//!     → ok:  Set-Cookie shop_currency=EUR
//!     → bad: InvalidInput, no cookie written
//!
//! Any page render:
//!     Cookie shop_currency
//!     → CurrencyCode::from_headers (whitelist check)
//!     → value, or USD when absent/invalid
//! ```
//!
//! # Design Decisions
//! - The whitelist is closed and compiled in
//! - A `CurrencyCode` can only be built from a whitelisted code, so an
//!   unvalidated value never reaches a pricing call

use std::convert::Infallible;
use std::fmt;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use serde::Serialize;

use crate::http::GatewayError;
use crate::session::{read_cookie, SetCookie, CURRENCY_COOKIE};

/// Accepted display currencies.
pub const WHITELIST: [&str; 4] = ["USD", "EUR", "CAD", "JPY"];

/// Currency used when the visitor has not picked a valid one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A whitelisted currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CurrencyCode(&'static str);

impl CurrencyCode {
    /// Accept `code` only if it is on the whitelist (exact match).
    pub fn parse(code: &str) -> Option<Self> {
        WHITELIST.iter().find(|c| **c == code).map(|c| Self(*c))
    }

    /// Visitor's currency from the cookie, or the default.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        read_cookie(headers, CURRENCY_COOKIE)
            .and_then(Self::parse)
            .unwrap_or_default()
    }

    pub fn all() -> impl Iterator<Item = CurrencyCode> {
        WHITELIST.into_iter().map(CurrencyCode)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self(DEFAULT_CURRENCY)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl<S> FromRequestParts<S> for CurrencyCode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Validate a requested currency and produce the cookie persisting it.
///
/// Unknown codes fail; there is no fallback to the default.
pub fn select(requested: &str) -> Result<(CurrencyCode, SetCookie), GatewayError> {
    let code = CurrencyCode::parse(requested).ok_or_else(|| {
        GatewayError::InvalidInput(format!("unsupported currency {:?}", requested))
    })?;
    Ok((code, SetCookie::persistent(CURRENCY_COOKIE, code.as_str())))
}

/// The subset of `supported` (as reported by the currency service) that is
/// also whitelisted, in the service's order.
pub fn displayable(supported: &[String]) -> Vec<CurrencyCode> {
    supported
        .iter()
        .filter_map(|code| CurrencyCode::parse(code))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn cookie(line: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::COOKIE, HeaderValue::from_str(line).unwrap());
        map
    }

    #[test]
    fn test_whitelist_membership() {
        for code in WHITELIST {
            assert_eq!(CurrencyCode::parse(code).unwrap().as_str(), code);
        }
        assert!(CurrencyCode::parse("GBP").is_none());
        assert!(CurrencyCode::parse("usd").is_none());
        assert!(CurrencyCode::parse("").is_none());
    }

    #[test]
    fn test_select_valid() {
        let (code, cookie) = select("EUR").unwrap();
        assert_eq!(code.as_str(), "EUR");
        assert_eq!(cookie.name, CURRENCY_COOKIE);
        assert_eq!(cookie.value, "EUR");
        assert!(!cookie.is_expired());
    }

    #[test]
    fn test_select_invalid_has_no_fallback() {
        assert!(matches!(select("XXX"), Err(GatewayError::InvalidInput(_))));
        assert!(matches!(select("GBP"), Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn test_from_headers() {
        assert_eq!(CurrencyCode::from_headers(&HeaderMap::new()).as_str(), "USD");
        assert_eq!(CurrencyCode::from_headers(&cookie("shop_currency=JPY")).as_str(), "JPY");
        assert_eq!(CurrencyCode::from_headers(&cookie("shop_currency=BTC")).as_str(), "USD");
    }

    #[test]
    fn test_displayable_intersection() {
        let supported: Vec<String> = ["JPY", "GBP", "USD", "TRY", "EUR"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let shown: Vec<_> = displayable(&supported).iter().map(|c| c.as_str()).collect();
        assert_eq!(shown, vec!["JPY", "USD", "EUR"]);
    }

    #[test]
    fn test_all_matches_whitelist() {
        assert_eq!(CurrencyCode::all().count(), WHITELIST.len());
    }
}
