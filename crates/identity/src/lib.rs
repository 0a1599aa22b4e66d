//! Identity propagation for the edge gateway.
//!
//! Turns the claims of an already validated JWT into the trusted `X-User-*` headers consumed by
//! downstream services. Nothing in this crate can fail a request: missing or malformed claims
//! degrade to defaults, and requests without a token pass through untouched.

mod claims;
pub mod extract;
mod headers;
mod token;

use std::sync::Arc;

use http::Request;

pub use claims::Claims;
pub use headers::{IDENTITY_HEADERS, IdentityHeaders, X_USER_EMAIL, X_USER_ID, X_USER_NAME, X_USER_ROLES, X_USER_USERNAME};
pub use token::Token;

/// The principal the authentication layer attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    /// A validated bearer JWT.
    Jwt(Arc<Token>),
    /// A request on a public route that carried no credentials.
    Anonymous,
}

impl Authentication {
    /// The JWT token, if this principal has one.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Authentication::Jwt(token) => Some(token),
            Authentication::Anonymous => None,
        }
    }
}

impl From<Token> for Authentication {
    fn from(token: Token) -> Self {
        Authentication::Jwt(Arc::new(token))
    }
}

/// Runs the identity step of the request pipeline.
///
/// Calls `next` exactly once. With a JWT principal the request handed to `next` carries the
/// identity headers, overriding anything the client sent under those names. Without a principal,
/// or with a non-JWT one, `next` receives the original request as-is.
pub fn forward<B, F, R>(request: Request<B>, authentication: Option<&Authentication>, next: F) -> R
where
    F: FnOnce(Request<B>) -> R,
{
    match authentication.and_then(Authentication::token) {
        Some(token) => next(IdentityHeaders::from_token(token).apply(request)),
        None => next(request),
    }
}
