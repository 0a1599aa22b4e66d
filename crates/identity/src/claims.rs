use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An open-ended JWT claim set with typed, non-failing accessors.
///
/// Every accessor returns `None` when the claim is missing *or* has a different shape than asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Builds claims from any JSON value. Anything but an object yields an empty claim set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Lookup by dotted path, e.g. `realm_access.roles`.
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;

        for part in parts {
            current = current.as_object()?.get(part)?;
        }

        Some(current)
    }

    /// A claim that must be a JSON string.
    pub fn string(&self, path: &str) -> Option<&str> {
        self.path(path)?.as_str()
    }

    /// A claim that must be a JSON integer, e.g. `iat` or `exp`.
    pub fn integer(&self, path: &str) -> Option<i64> {
        self.path(path)?.as_i64()
    }

    /// A claim that must be an array whose elements are all strings.
    ///
    /// A single non-string element disqualifies the whole array.
    pub fn string_list(&self, path: &str) -> Option<Vec<&str>> {
        self.path(path)?.as_array()?.iter().map(Value::as_str).collect()
    }

    /// The `aud` claim, which may be a single string or an array of strings.
    pub fn audiences(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the given audience is one of the token audiences.
    pub fn has_audience(&self, expected: &str) -> bool {
        self.audiences().contains(&expected)
    }
}
