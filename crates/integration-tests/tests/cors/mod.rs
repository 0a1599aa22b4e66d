use indoc::{formatdoc, indoc};
use integration_tests::{IdentityProvider, TestServer};
use reqwest::Method;

const FRONTEND_CORS: &str = indoc! {r#"
    [server.cors]
    allow_credentials = true
    allow_origins = ["http://localhost:3000", "http://localhost:8080"]
    allow_methods = ["GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"]
    allow_headers = "*"
    max_age = "1h"
"#};

fn access_control_headers(response: &reqwest::Response) -> Vec<String> {
    let mut headers: Vec<_> = response
        .headers()
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("access-control-"))
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap()))
        .collect();

    headers.sort();
    headers
}

#[tokio::test]
async fn default_behavior() {
    let server = TestServer::start("").await;

    let response = server
        .client
        .request(Method::OPTIONS, "/videos")
        .header("Origin", "https://example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn frontend_preflight_on_protected_path() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        {FRONTEND_CORS}
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;

    let response = server
        .client
        .request(Method::OPTIONS, "/videos")
        .header("Origin", "http://localhost:8080")
        .header("Access-Control-Request-Method", "DELETE")
        .header("Access-Control-Request-Headers", "authorization")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    insta::assert_debug_snapshot!(access_control_headers(&response), @r#"
    [
        "access-control-allow-credentials: true",
        "access-control-allow-headers: authorization",
        "access-control-allow-methods: GET,POST,PUT,DELETE,OPTIONS,PATCH",
        "access-control-allow-origin: http://localhost:8080",
        "access-control-max-age: 3600",
    ]
    "#);
}

#[tokio::test]
async fn rejected_request_still_carries_cors_headers() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        {FRONTEND_CORS}
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;

    let response = server
        .client
        .request(Method::GET, "/videos")
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);

    insta::assert_debug_snapshot!(access_control_headers(&response), @r#"
    [
        "access-control-allow-credentials: true",
        "access-control-allow-origin: http://localhost:3000",
    ]
    "#);
}

#[tokio::test]
async fn unknown_origin() {
    let server = TestServer::start(FRONTEND_CORS).await;

    let response = server
        .client
        .request(Method::OPTIONS, "/videos")
        .header("Origin", "https://evil.example")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}
