use chrono::{DateTime, Utc};

use crate::claims::Claims;

const REALM_ROLES: &str = "realm_access.roles";

/// A validated bearer token as handed over by the authentication layer.
///
/// The token is trusted as-is; nothing here re-validates signatures or lifetimes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    subject: Option<String>,
    issuer: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    claims: Claims,
}

impl Token {
    /// Creates a token from its claim set.
    ///
    /// Registered claims (`sub`, `iss`, `iat`, `exp`) are read from the map when they have the
    /// expected type; otherwise they stay unset.
    pub fn new(claims: Claims) -> Self {
        let subject = claims.string("sub").map(str::to_owned);
        let issuer = claims.string("iss").map(str::to_owned);
        let issued_at = claims.integer("iat").and_then(|secs| DateTime::from_timestamp(secs, 0));
        let expires_at = claims.integer("exp").and_then(|secs| DateTime::from_timestamp(secs, 0));

        Self {
            subject,
            issuer,
            issued_at,
            expires_at,
            claims,
        }
    }

    /// Overrides the issuance time, for decoders that parse `iat` themselves.
    pub fn with_issued_at(mut self, issued_at: Option<DateTime<Utc>>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Overrides the expiration time, for decoders that parse `exp` themselves.
    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Realm roles from `realm_access.roles`, in token order.
    pub fn realm_roles(&self) -> Option<Vec<&str>> {
        self.claims.string_list(REALM_ROLES)
    }

    /// Granted authorities derived from realm roles: `admin` becomes `ROLE_ADMIN`.
    pub fn authorities(&self) -> Vec<String> {
        self.realm_roles()
            .unwrap_or_default()
            .into_iter()
            .map(|role| format!("ROLE_{}", role.to_uppercase()))
            .collect()
    }
}
