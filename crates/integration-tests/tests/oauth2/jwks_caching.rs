use std::time::Duration;

use indoc::formatdoc;
use integration_tests::{IdentityProvider, TestServer};
use serde_json::json;

use super::gateway;

#[tokio::test]
async fn keys_are_fetched_once() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    let token = idp.token(json!({ "sub": "u1" }));

    for _ in 0..5 {
        assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);
    }

    assert_eq!(idp.jwks_requests(), 1);
}

#[tokio::test]
async fn keys_are_refetched_after_poll_interval() {
    let idp = IdentityProvider::start().await;

    let config = formatdoc! {r#"
        {oauth}
        poll_interval = "100ms"
    "#, oauth = idp.oauth_section()};

    let server = TestServer::start(&config).await;
    let token = idp.token(json!({ "sub": "u1" }));

    assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);
    assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);
    assert_eq!(idp.jwks_requests(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);
    assert_eq!(idp.jwks_requests(), 2);
}

#[tokio::test]
async fn unavailable_identity_provider() {
    let idp = IdentityProvider::start().await;
    let server = gateway(&idp).await;

    idp.set_unavailable(true);

    let token = idp.token(json!({ "sub": "u1" }));
    let response = server.client.get_with_token("/videos", &token).await;

    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "internal_server_error",
      "error_description": "An internal error occurred"
    }
    "#);

    // Anonymous requests to public paths do not need the keys.
    assert_eq!(server.client.get("/test/ping").await.status(), 200);

    // Failures are not cached.
    idp.set_unavailable(false);
    assert_eq!(server.client.get_with_token("/videos", &token).await.status(), 200);
}
