mod jwks_caching;
mod token_validation;

use indoc::formatdoc;
use integration_tests::{IdentityProvider, RequestBuilderExt, TestServer};
use reqwest::Method;
use serde_json::json;

async fn gateway(idp: &IdentityProvider) -> TestServer {
    TestServer::start(&idp.oauth_section()).await
}

#[tokio::test]
async fn protected_path_without_token() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let response = server.client.get("/videos").await;

    assert_eq!(response.status(), 401);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "unauthorized"
    }
    "#);
}

#[tokio::test]
async fn public_paths_without_token() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    for path in ["/actuator", "/actuator/health", "/health", "/test/anything/at/all"] {
        let response = server.client.get(path).await;
        assert_eq!(response.status(), 200, "{path}");
    }

    for path in ["/", "/healthz", "/testing", "/api/me"] {
        let response = server.client.get(path).await;
        assert_eq!(response.status(), 401, "{path}");
    }
}

#[tokio::test]
async fn custom_public_paths() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        [server.security]
        public_paths = ["/videos/*/thumbnail", "/docs/**"]
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;

    assert_eq!(server.client.get("/videos/42/thumbnail").await.status(), 200);
    assert_eq!(server.client.get("/docs").await.status(), 200);
    assert_eq!(server.client.get("/docs/api/v1").await.status(), 200);
    assert_eq!(server.client.get("/videos/42").await.status(), 401);

    // The health endpoint stays public even when it is not listed.
    assert_eq!(server.client.get("/health").await.status(), 200);
    // Defaults are replaced, not extended.
    assert_eq!(server.client.get("/actuator/health").await.status(), 401);
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let token = idp.token(json!({ "sub": "u1" }));

    for scheme in ["bearer", "BEARER", "BeArEr"] {
        let response = server
            .client
            .request(Method::GET, "/videos")
            .header("Authorization", format!("{scheme} {token}"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200, "{scheme}");
    }
}

#[tokio::test]
async fn invalid_credentials_are_rejected_on_public_paths() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let token = idp.forged_token(json!({ "sub": "u1" }));

    let response = server.client.request(Method::GET, "/health").bearer(&token).send().await.unwrap();

    // The health endpoint does not look at credentials.
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .request(Method::GET, "/test/ping")
        .bearer(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(
        response.headers()["www-authenticate"],
        r#"Bearer error="invalid_token", error_description="token validation failed""#
    );
}

#[tokio::test]
async fn non_bearer_scheme() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let response = server
        .client
        .request(Method::GET, "/videos")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "invalid_token",
      "error_description": "token must be prefixed with Bearer"
    }
    "#);
}

#[tokio::test]
async fn cors_preflight_skips_authentication() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let response = server
        .client
        .request(Method::OPTIONS, "/videos")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}
