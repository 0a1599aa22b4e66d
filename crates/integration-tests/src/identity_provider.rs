//! A minimal identity provider: serves a JWKS with one HMAC key and mints tokens for it.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jwt_compact::{
    AlgorithmExt, Claims, Header, TimeOptions,
    alg::{Hs256, Hs256Key},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const KEY_ID: &str = "test-key";
pub const ISSUER: &str = "http://127.0.0.1:8180/realms/video";

const SECRET: &[u8] = b"edge-gateway-integration-secret!";

#[derive(Default)]
struct ProviderState {
    requests: AtomicUsize,
    unavailable: AtomicBool,
}

pub struct IdentityProvider {
    address: SocketAddr,
    state: Arc<ProviderState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl IdentityProvider {
    pub async fn start() -> Self {
        let state = Arc::new(ProviderState::default());

        let app = Router::new()
            .route("/realms/video/protocol/openid-connect/certs", get(jwks))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            address,
            state,
            _handle: handle,
        }
    }

    pub fn jwks_url(&self) -> String {
        format!("http://{}/realms/video/protocol/openid-connect/certs", self.address)
    }

    /// A `[server.oauth]` section pointing at this provider.
    pub fn oauth_section(&self) -> String {
        format!("[server.oauth]\nurl = \"{}\"\n", self.jwks_url())
    }

    /// How many times the JWKS was fetched.
    pub fn jwks_requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Makes the JWKS endpoint answer 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// A token valid for an hour carrying `claims`, issued by [`ISSUER`] unless `claims` says otherwise.
    pub fn token(&self, claims: Value) -> String {
        let claims = Claims::new(with_issuer(claims)).set_duration_and_issuance(&TimeOptions::default(), Duration::hours(1));

        sign(SECRET, &claims)
    }

    /// A token that expired ten minutes ago.
    pub fn expired_token(&self, claims: Value) -> String {
        let mut claims = Claims::new(with_issuer(claims));
        claims.issued_at = Some(Utc::now() - Duration::hours(1));
        claims.expiration = Some(Utc::now() - Duration::minutes(10));

        sign(SECRET, &claims)
    }

    /// A well-formed token signed with a key the provider does not publish.
    pub fn forged_token(&self, claims: Value) -> String {
        let claims = Claims::new(with_issuer(claims)).set_duration_and_issuance(&TimeOptions::default(), Duration::hours(1));

        sign(b"some-other-secret-nobody-trusts!", &claims)
    }
}

fn with_issuer(mut claims: Value) -> Value {
    if let Some(object) = claims.as_object_mut() {
        object.entry("iss").or_insert_with(|| json!(ISSUER));
    }

    claims
}

fn sign(secret: &[u8], claims: &Claims<Value>) -> String {
    let header = Header::empty().with_key_id(KEY_ID);

    Hs256.token(&header, claims, &Hs256Key::new(secret)).unwrap()
}

async fn jwks(State(state): State<Arc<ProviderState>>) -> impl IntoResponse {
    state.requests.fetch_add(1, Ordering::SeqCst);

    if state.unavailable.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    Json(json!({
        "keys": [{
            "kty": "oct",
            "kid": KEY_ID,
            "k": URL_SAFE_NO_PAD.encode(SECRET),
        }]
    }))
    .into_response()
}
