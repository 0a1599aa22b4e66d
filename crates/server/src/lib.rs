//! Edge gateway server library.
//!
//! Authenticates incoming requests, enforces the public/protected path policy and forwards the
//! caller's identity to the downstream router as `X-User-*` headers. Used by the binary and by
//! the integration tests.

#![deny(missing_docs)]

mod access;
mod auth;
mod cors;
mod health;
mod propagation;
mod user_info;

use std::net::SocketAddr;

use anyhow::anyhow;
use auth::AuthLayer;
use axum::{Router, routing::get};
use axum_server::tls_rustls::RustlsConfig;
use config::Config;
use propagation::IdentityLayer;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Configuration for serving the gateway.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized gateway TOML configuration.
    pub config: Config,
    /// The routes behind the gateway. They receive requests after authentication, with the
    /// identity headers already set.
    pub downstream: Router,
}

/// Assembles the gateway around `downstream`.
///
/// From the outside in: CORS, authentication, identity propagation, then the downstream routes
/// and the user-info endpoints. The health endpoint skips authentication. Without
/// `[server.oauth]` the access policy still applies and credentials are rejected. Panics like
/// [`Router::merge`] if `downstream` defines the user-info or health paths itself.
pub fn router(config: &Config, downstream: Router) -> Router {
    let server = &config.server;

    let cors = match &server.cors {
        Some(cors_config) => cors::generate(cors_config),
        None => CorsLayer::permissive(),
    };

    let mut protected_router = downstream;

    if server.user_info.enabled {
        protected_router = protected_router.merge(user_info::router(server.user_info.prefix()));
    }

    if server.oauth.is_none() {
        log::warn!("No [server.oauth] configured: bearer tokens cannot be validated and are rejected");
    }

    let mut app = protected_router
        .layer(IdentityLayer)
        .layer(AuthLayer::new(server.oauth.clone(), &server.security));

    if server.health.enabled && server.health.listen.is_none() {
        app = app.merge(Router::new().route(&server.health.path, get(health::health)));
    }

    app.layer(cors)
}

/// Starts and runs the gateway with the provided configuration.
pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        downstream,
    }: ServeConfig,
) -> anyhow::Result<()> {
    let app = router(&config, downstream);

    if config.server.health.enabled
        && let Some(listen) = config.server.health.listen
    {
        let tls = config.server.tls.clone();
        let health = config.server.health.clone();

        tokio::spawn(async move {
            if let Err(e) = health::bind_health_endpoint(listen, tls, health).await {
                log::error!("{e}");
            }
        });
    }

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| anyhow!("Failed to load TLS certificate and key: {e}"))?;

            log::info!("Gateway listening at https://{listen_address}");

            axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)
                .serve(app.into_make_service())
                .await
                .map_err(|e| anyhow!("Failed to start HTTPS server: {e}"))?;
        }
        None => {
            log::info!("Gateway listening at http://{listen_address}");

            axum::serve(listener, app)
                .await
                .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;
        }
    }

    Ok(())
}
