//! Access policy: which paths need a bearer token.

use serde::Deserialize;

/// How requests without credentials are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPolicy {
    /// Paths outside `public_paths` require a valid bearer token.
    #[default]
    Protected,
    /// Every path is reachable without credentials. Tokens that are sent are still validated.
    PermitAll,
}

/// Access policy configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// The policy for paths not listed as public.
    pub policy: SecurityPolicy,
    /// Glob patterns of paths reachable without credentials. `/docs/**` matches `/docs` too.
    pub public_paths: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            policy: SecurityPolicy::Protected,
            public_paths: vec!["/actuator/**".into(), "/health".into(), "/test/**".into()],
        }
    }
}
