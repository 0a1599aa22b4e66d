use std::net::SocketAddr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use config::{HealthConfig, TlsServerConfig};

use axum::{Json, Router, routing::get};

const SERVICE_NAME: &str = "video-api-gateway";
const MESSAGE: &str = "Gateway is running! 🚀";

#[derive(Debug, serde::Serialize)]
pub(crate) struct HealthStatus {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
    message: &'static str,
}

/// Reports the gateway as up. Never requires authentication.
pub(crate) async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP",
        service: SERVICE_NAME,
        timestamp: Utc::now(),
        message: MESSAGE,
    })
}

/// Serves the health endpoint on its own address.
pub(super) async fn bind_health_endpoint(
    addr: SocketAddr,
    tls_config: Option<TlsServerConfig>,
    health_config: HealthConfig,
) -> anyhow::Result<()> {
    let scheme = if tls_config.is_some() { "https" } else { "http" };
    let path = &health_config.path;
    let app = Router::new().route(path, get(health)).into_make_service();

    log::info!("Health check endpoint exposed at {scheme}://{addr}{path}");

    match tls_config {
        Some(tls) => {
            let rustls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.certificate, &tls.key)
                .await
                .map_err(|e| anyhow!("Failed to load TLS certificate and key: {e}"))?;

            axum_server::bind_rustls(addr, rustls_config)
                .serve(app)
                .await
                .map_err(|e| anyhow!("Failed to start the health endpoint: {e}"))?;
        }
        None => axum_server::bind(addr)
            .serve(app)
            .await
            .map_err(|e| anyhow!("Failed to start the health endpoint: {e}"))?,
    }

    Ok(())
}
