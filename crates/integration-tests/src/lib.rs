pub mod downstream;
pub mod identity_provider;

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use axum::Router;
use config::Config;
use reqwest::Method;
use server::ServeConfig;
use tokio::net::TcpListener;
use tokio::time::timeout;

pub use identity_provider::IdentityProvider;

static INIT: Once = Once::new();

fn init_crypto_provider() {
    INIT.call_once(|| {
        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .expect("Failed to install default crypto provider");
    });
}

/// Extension trait for attaching bearer tokens to requests.
pub trait RequestBuilderExt {
    /// Add `Authorization: Bearer {token}`.
    fn bearer(self, token: &str) -> Self;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }
}

/// Test client for making HTTP requests to the test server
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Start building a request to the given path
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.request(Method::GET, path).send().await.unwrap()
    }

    /// Send a GET request with a bearer token
    pub async fn get_with_token(&self, path: &str, token: &str) -> reqwest::Response {
        self.request(Method::GET, path).bearer(token).send().await.unwrap()
    }
}

/// Test server that manages the lifecycle of a gateway instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

pub struct TestServerBuilder {
    downstream: Router,
}

impl TestServerBuilder {
    /// Replace the default echo service behind the gateway
    pub fn downstream(mut self, downstream: Router) -> Self {
        self.downstream = downstream;
        self
    }

    /// Start the gateway with the given TOML configuration
    pub async fn build(self, config_toml: &str) -> TestServer {
        init_crypto_provider();

        let config: Config = toml::from_str(config_toml).unwrap();
        config.validate().unwrap();

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let serve_config = ServeConfig {
            listen_address: address,
            config,
            downstream: self.downstream,
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let result = server::serve(serve_config).await;
            let _ = tx.send(result);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;

        if let Ok(Err(e)) = rx.try_recv() {
            eprintln!("Gateway failed to start: {e}");
            std::process::exit(1);
        }

        let client = TestClient::new(format!("http://{address}"));

        let mut retries = 10;
        while retries > 0 {
            if timeout(Duration::from_millis(100), client.request(Method::GET, "/").send())
                .await
                .is_ok_and(|response| response.is_ok())
            {
                break;
            }

            retries -= 1;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestServer {
            client,
            address,
            _handle: handle,
        }
    }
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder {
            downstream: downstream::echo(),
        }
    }

    /// Start the gateway in front of the echo service
    pub async fn start(config_toml: &str) -> Self {
        Self::builder().build(config_toml).await
    }
}
