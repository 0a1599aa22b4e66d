//! Claim extraction for the identity headers.
//!
//! Each function is total: a missing claim or a claim of the wrong type yields the documented
//! default, never an error.

use crate::Token;

/// Value of `X-User-Id` when the token has no subject.
pub const UNKNOWN_USER: &str = "unknown";

/// The token subject, or `"unknown"`.
pub fn extract_user_id(token: &Token) -> String {
    token.subject().unwrap_or(UNKNOWN_USER).to_owned()
}

/// The `email` claim, or an empty string.
pub fn extract_email(token: &Token) -> String {
    string_claim(token, "email")
}

/// The `name` claim, or an empty string.
pub fn extract_name(token: &Token) -> String {
    string_claim(token, "name")
}

/// The `preferred_username` claim, or an empty string.
pub fn extract_username(token: &Token) -> String {
    string_claim(token, "preferred_username")
}

/// Realm roles joined with `,` in token order, or an empty string.
pub fn extract_roles(token: &Token) -> String {
    token.realm_roles().map(|roles| roles.join(",")).unwrap_or_default()
}

fn string_claim(token: &Token, name: &str) -> String {
    token.claims().string(name).unwrap_or_default().to_owned()
}
