//! Session identity subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (Cookie: shop_session-id=...)
//!     → identity.rs ensure_session (resolve or mint)
//!     → SessionId in request extensions
//!     → handler (extracts SessionId / RequestContext)
//!     → response
//!     → Set-Cookie shop_session-id (only when minted)
//! ```
//!
//! # Design Decisions
//! - No server-side session store; the cookie is the whole state
//! - Ids are opaque: no structural validation of incoming values
//! - Logout only expires cookies and is never gated

pub mod cookies;
pub mod identity;

pub use cookies::{
    read_cookie, SetCookie, COOKIE_MAX_AGE, COOKIE_PREFIX, CURRENCY_COOKIE, SESSION_COOKIE,
};
pub use identity::{ensure_session, logout_cookies, Resolution, SessionId};
