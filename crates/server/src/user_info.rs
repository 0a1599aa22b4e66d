//! Endpoints describing the caller, handy for checking what a token carries.

use axum::{Extension, Json, Router, routing::get};
use chrono::{DateTime, Utc};
use identity::{Authentication, Token, extract::UNKNOWN_USER};
use serde::Serialize;

use crate::auth::AuthError;

pub(crate) fn router(prefix: &str) -> Router {
    Router::new()
        .route(&format!("{prefix}/me"), get(me))
        .route(&format!("{prefix}/hello"), get(hello))
}

#[derive(Debug, Serialize)]
struct Me<'a> {
    subject: Option<&'a str>,
    email: Option<&'a str>,
    name: Option<&'a str>,
    preferred_username: Option<&'a str>,
    roles: Vec<&'a str>,
    authorities: Vec<String>,
    token_issued_at: Option<DateTime<Utc>>,
    token_expires_at: Option<DateTime<Utc>>,
    issuer: Option<&'a str>,
}

impl<'a> From<&'a Token> for Me<'a> {
    fn from(token: &'a Token) -> Self {
        let claims = token.claims();

        Me {
            subject: token.subject(),
            email: claims.string("email"),
            name: claims.string("name"),
            preferred_username: claims.string("preferred_username"),
            roles: token.realm_roles().unwrap_or_default(),
            authorities: token.authorities(),
            token_issued_at: token.issued_at(),
            token_expires_at: token.expires_at(),
            issuer: token.issuer(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Hello {
    message: String,
    authenticated: &'static str,
}

fn require_token(authentication: Option<&Authentication>) -> Result<&Token, AuthError> {
    authentication
        .and_then(Authentication::token)
        .ok_or(AuthError::MissingToken)
}

async fn me(authentication: Option<Extension<Authentication>>) -> Result<Json<serde_json::Value>, AuthError> {
    let authentication = authentication.map(|Extension(authentication)| authentication);
    let token = require_token(authentication.as_ref())?;

    serde_json::to_value(Me::from(token))
        .map(Json)
        .map_err(|_| AuthError::Internal)
}

async fn hello(authentication: Option<Extension<Authentication>>) -> Result<Json<Hello>, AuthError> {
    let authentication = authentication.map(|Extension(authentication)| authentication);
    let token = require_token(authentication.as_ref())?;

    let username = token.claims().string("preferred_username").unwrap_or(UNKNOWN_USER);

    Ok(Json(Hello {
        message: format!("Hello, {username}!"),
        authenticated: "true",
    }))
}
