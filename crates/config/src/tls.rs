//! TLS configuration for the gateway listener.

use std::path::PathBuf;

use serde::Deserialize;

/// TLS certificate and key, both PEM encoded.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsServerConfig {
    /// Path to the certificate chain.
    pub certificate: PathBuf,
    /// Path to the private key.
    pub key: PathBuf,
}
