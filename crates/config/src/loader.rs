use std::{path::Path, str::FromStr};

use anyhow::bail;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use std::fmt::Write;
use toml::Value;

use crate::{Config, SecurityPolicy};

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref().to_path_buf();
    let content = std::fs::read_to_string(&path)?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;

    for warning in validate(&config)? {
        log::warn!("{warning}");
    }

    Ok(config)
}

/// Rejects configurations the server cannot honor and collects warnings for the risky ones.
pub(crate) fn validate(config: &Config) -> anyhow::Result<Vec<String>> {
    let mut warnings = Vec::new();
    let server = &config.server;

    for pattern in &server.security.public_paths {
        if !pattern.starts_with('/') {
            bail!("Public path pattern '{pattern}' must start with '/'");
        }
    }

    if server.user_info.enabled && !server.user_info.path.starts_with('/') {
        bail!("User info path '{}' must start with '/'", server.user_info.path);
    }

    if !server.health.path.starts_with('/') {
        bail!("Health path '{}' must start with '/'", server.health.path);
    }

    if server.security.policy == SecurityPolicy::PermitAll {
        warnings.push(
            "Security policy is permit_all: requests without a bearer token reach every route".to_string(),
        );
    }

    if !server.uses_oauth() {
        warnings.push(
            "No [server.oauth] section: bearer tokens are rejected and protected paths answer 401".to_string(),
        );
    }

    Ok(warnings)
}

fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut p = String::new();

                for segment in path.iter() {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => write!(p, "[{i}]")?,
                    }
                }

                if p.ends_with('.') {
                    p.pop();
                }

                bail!("Failed to expand dynamic string at path '{p}': {err}");
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}
