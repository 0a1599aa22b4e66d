//! HTTP server configuration settings.

use std::net::SocketAddr;

use serde::Deserialize;

use crate::{CorsConfig, HealthConfig, OauthConfig, SecurityConfig, TlsServerConfig, UserInfoConfig};

/// HTTP server configuration settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the gateway should listen on.
    pub listen_address: Option<SocketAddr>,
    /// TLS configuration for secure connections.
    pub tls: Option<TlsServerConfig>,
    /// Health endpoint configuration.
    #[serde(default)]
    pub health: HealthConfig,
    /// CORS configuration. Without it every origin is allowed.
    pub cors: Option<CorsConfig>,
    /// JWT validation against the identity provider. Without it no request is authenticated.
    pub oauth: Option<OauthConfig>,
    /// Which paths require a bearer token.
    #[serde(default)]
    pub security: SecurityConfig,
    /// The built-in user information endpoints.
    #[serde(default)]
    pub user_info: UserInfoConfig,
}

impl ServerConfig {
    /// Returns whether bearer token authentication is configured for this server.
    pub fn uses_oauth(&self) -> bool {
        self.oauth.is_some()
    }
}
