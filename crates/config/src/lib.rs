//! Gateway configuration structures to map the gateway.toml configuration.

#![deny(missing_docs)]

mod cors;
mod health;
mod loader;
mod oauth;
mod security;
mod server;
mod tls;
mod user_info;

use std::path::Path;

pub use cors::*;
pub use health::HealthConfig;
pub use oauth::OauthConfig;
pub use security::{SecurityConfig, SecurityPolicy};
use serde::Deserialize;
pub use server::ServerConfig;
pub use tls::TlsServerConfig;
pub use user_info::UserInfoConfig;

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates the configuration, returning warnings for settings that are allowed but risky.
    pub fn validate(&self) -> anyhow::Result<Vec<String>> {
        loader::validate(self)
    }
}
