use http::{HeaderMap, HeaderName, HeaderValue, Request};

use crate::{Token, extract};

/// Subject of the token.
pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
/// The `email` claim.
pub const X_USER_EMAIL: HeaderName = HeaderName::from_static("x-user-email");
/// The `name` claim.
pub const X_USER_NAME: HeaderName = HeaderName::from_static("x-user-name");
/// The `preferred_username` claim.
pub const X_USER_USERNAME: HeaderName = HeaderName::from_static("x-user-username");
/// Realm roles, comma separated.
pub const X_USER_ROLES: HeaderName = HeaderName::from_static("x-user-roles");

/// The five trusted identity headers, in the order they are written.
pub const IDENTITY_HEADERS: [HeaderName; 5] = [X_USER_ID, X_USER_EMAIL, X_USER_NAME, X_USER_USERNAME, X_USER_ROLES];

/// Identity header values derived from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub roles: String,
}

impl IdentityHeaders {
    /// Extracts every header value from the token, falling back to defaults on missing claims.
    pub fn from_token(token: &Token) -> Self {
        Self {
            user_id: extract::extract_user_id(token),
            email: extract::extract_email(token),
            name: extract::extract_name(token),
            username: extract::extract_username(token),
            roles: extract::extract_roles(token),
        }
    }

    /// Writes the headers into the map, replacing every existing value with the same name.
    pub fn write_to(&self, headers: &mut HeaderMap) {
        let values = [&self.user_id, &self.email, &self.name, &self.username, &self.roles];

        for (name, value) in IDENTITY_HEADERS.into_iter().zip(values) {
            headers.insert(name, header_value(value));
        }
    }

    /// Consumes the request and returns a new one carrying the identity headers.
    ///
    /// Method, URI, version, body, extensions and unrelated headers are carried over untouched.
    pub fn apply<B>(&self, request: Request<B>) -> Request<B> {
        let (mut parts, body) = request.into_parts();
        self.write_to(&mut parts.headers);

        Request::from_parts(parts, body)
    }
}

/// Converts a claim into a header value. Bytes not allowed in header values are dropped.
fn header_value(value: &str) -> HeaderValue {
    if let Ok(value) = HeaderValue::from_str(value) {
        return value;
    }

    let bytes: Vec<u8> = value
        .bytes()
        .filter(|&b| (b >= 0x20 && b != 0x7f) || b == b'\t')
        .collect();

    HeaderValue::from_bytes(&bytes).unwrap_or_else(|_| HeaderValue::from_static(""))
}
