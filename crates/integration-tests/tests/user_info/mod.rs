use indoc::formatdoc;
use integration_tests::{IdentityProvider, TestServer};
use serde_json::json;

async fn gateway(idp: &IdentityProvider) -> TestServer {
    TestServer::start(&idp.oauth_section()).await
}

#[tokio::test]
async fn me() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let token = idp.token(json!({
        "sub": "f2a1c3d4",
        "email": "maria@example.com",
        "preferred_username": "maria",
        "realm_access": { "roles": ["user", "admin"] },
    }));

    let response = server.client.get_with_token("/api/me", &token).await;
    assert_eq!(response.status(), 200);

    let mut body: serde_json::Value = response.json().await.unwrap();

    let issued_at = body["token_issued_at"].take();
    let expires_at = body["token_expires_at"].take();
    assert!(issued_at.is_string());
    assert!(expires_at.is_string());

    insta::assert_json_snapshot!(body, @r#"
    {
      "authorities": [
        "ROLE_USER",
        "ROLE_ADMIN"
      ],
      "email": "maria@example.com",
      "issuer": "http://127.0.0.1:8180/realms/video",
      "name": null,
      "preferred_username": "maria",
      "roles": [
        "user",
        "admin"
      ],
      "subject": "f2a1c3d4",
      "token_expires_at": null,
      "token_issued_at": null
    }
    "#);
}

#[tokio::test]
async fn hello() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let token = idp.token(json!({ "sub": "u1", "preferred_username": "maria" }));
    let body: serde_json::Value = server.client.get_with_token("/api/hello", &token).await.json().await.unwrap();

    insta::assert_json_snapshot!(body, @r#"
    {
      "authenticated": "true",
      "message": "Hello, maria!"
    }
    "#);
}

#[tokio::test]
async fn requires_a_token() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    assert_eq!(server.client.get("/api/me").await.status(), 401);
    assert_eq!(server.client.get("/api/hello").await.status(), 401);
}

#[tokio::test]
async fn unauthenticated_even_when_public() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        [server.security]
        public_paths = ["/api/**"]
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;

    let response = server.client.get("/api/me").await;
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "unauthorized" }));
}

#[tokio::test]
async fn custom_prefix() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        [server.user_info]
        path = "/debug"
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;
    let token = idp.token(json!({ "sub": "u1" }));

    assert_eq!(server.client.get_with_token("/debug/hello", &token).await.status(), 200);

    // Without the user-info route the echo service answers.
    let body: serde_json::Value = server.client.get_with_token("/api/hello", &token).await.json().await.unwrap();
    assert_eq!(body["path"], "/api/hello");
}
