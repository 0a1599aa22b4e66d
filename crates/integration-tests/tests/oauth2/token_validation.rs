use indoc::formatdoc;
use integration_tests::{IdentityProvider, RequestBuilderExt, TestServer, identity_provider::ISSUER};
use reqwest::Method;
use serde_json::json;

use super::gateway;

async fn rejection(server: &TestServer, token: &str) -> (u16, serde_json::Value) {
    let response = server.client.get_with_token("/videos", token).await;
    let status = response.status().as_u16();

    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn valid_token() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let token = idp.token(json!({ "sub": "u1" }));
    let response = server.client.get_with_token("/videos", &token).await;

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn expired_token() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let (status, body) = rejection(&server, &idp.expired_token(json!({ "sub": "u1" }))).await;

    assert_eq!(status, 401);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "invalid_token",
      "error_description": "token validation failed"
    }
    "#);
}

#[tokio::test]
async fn forged_signature() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let (status, body) = rejection(&server, &idp.forged_token(json!({ "sub": "u1" }))).await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn malformed_token() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let (status, body) = rejection(&server, "definitely.not.a-jwt").await;

    assert_eq!(status, 401);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "invalid_token",
      "error_description": "malformed token"
    }
    "#);
}

#[tokio::test]
async fn unsigned_token() {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(json!({ "sub": "admin", "exp": 4102444800u64 }).to_string());

    let (status, body) = rejection(&server, &format!("{header}.{claims}.")).await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn bare_bearer_scheme() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let response = server
        .client
        .request(Method::GET, "/videos")
        .header("Authorization", "Bearer")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error_description"], "missing token");
}

#[tokio::test]
async fn expected_issuer() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        expected_issuer = "{ISSUER}"
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;

    let token = idp.token(json!({ "sub": "u1" }));
    assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);

    let token = idp.token(json!({ "sub": "u1", "iss": "https://elsewhere.example/realms/video" }));
    let (status, _) = rejection(&server, &token).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn expected_audience() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        expected_audience = "video-gateway"
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;

    let token = idp.token(json!({ "sub": "u1", "aud": ["account", "video-gateway"] }));
    assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);

    let token = idp.token(json!({ "sub": "u1", "aud": "video-gateway" }));
    assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);

    let token = idp.token(json!({ "sub": "u1", "aud": "account" }));
    let (status, _) = rejection(&server, &token).await;
    assert_eq!(status, 401);

    let token = idp.token(json!({ "sub": "u1" }));
    let (status, _) = rejection(&server, &token).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn rejected_request_never_reaches_downstream() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let response = server
        .client
        .request(Method::DELETE, "/videos/42")
        .bearer(&idp.expired_token(json!({ "sub": "u1" })))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("path").is_none());
}
