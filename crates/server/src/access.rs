use config::{SecurityConfig, SecurityPolicy};

/// Decides which request paths need a bearer token.
pub(crate) struct AccessPolicy {
    policy: SecurityPolicy,
    public_paths: Vec<String>,
}

impl AccessPolicy {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            policy: config.policy,
            public_paths: config.public_paths.clone(),
        }
    }

    pub fn requires_authentication(&self, path: &str) -> bool {
        match self.policy {
            SecurityPolicy::PermitAll => false,
            SecurityPolicy::Protected => !self.is_public(path),
        }
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|pattern| matches(pattern, path))
    }
}

/// Glob match where a trailing `/**` also matches the bare prefix.
fn matches(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix("/**")
        && path == prefix
    {
        return true;
    }

    fast_glob::glob_match(pattern, path)
}
