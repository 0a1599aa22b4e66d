//! A downstream service that reports what the gateway forwarded to it.

use axum::{
    Json, Router,
    extract::Request,
    http::{HeaderMap, StatusCode},
};
use serde_json::{Map, Value, json};

const IDENTITY_HEADERS: [&str; 5] = ["x-user-id", "x-user-email", "x-user-name", "x-user-username", "x-user-roles"];

/// Answers every path with the method, path, authorization presence and identity headers it saw.
///
/// Identity headers are reported as arrays so duplicates become visible; absent ones are left out.
pub fn echo() -> Router {
    Router::new().fallback(|request: Request| async move {
        let headers = request.headers();

        Json(json!({
            "method": request.method().as_str(),
            "path": request.uri().path(),
            "authorization": headers.contains_key("authorization"),
            "identity": identity_headers(headers),
        }))
    })
}

/// A downstream that fails with the given status on every path.
pub fn failing(status: StatusCode) -> Router {
    Router::new().fallback(move || async move { (status, "downstream failure") })
}

fn identity_headers(headers: &HeaderMap) -> Value {
    let mut map = Map::new();

    for name in IDENTITY_HEADERS {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|value| Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        if !values.is_empty() {
            map.insert(name.to_string(), Value::Array(values));
        }
    }

    Value::Object(map)
}
