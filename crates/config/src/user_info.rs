//! Configuration of the built-in user information endpoints.

use std::borrow::Cow;

use serde::Deserialize;

/// Mounts `GET {path}/me` and `GET {path}/hello` behind authentication.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserInfoConfig {
    /// Whether the endpoints are mounted.
    pub enabled: bool,
    /// Path prefix of the endpoints.
    pub path: Cow<'static, str>,
}

impl Default for UserInfoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: Cow::Borrowed("/api"),
        }
    }
}

impl UserInfoConfig {
    /// The prefix without a trailing slash, so `/api/` and `/api` mount the same routes.
    pub fn prefix(&self) -> &str {
        self.path.trim_end_matches('/')
    }
}
