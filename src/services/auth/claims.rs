use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded payload of a verified access token.
///
/// Kept as the raw claim mapping (in payload order) so handlers see
/// exactly what the provider issued; the accessors below only read it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// The `permissions` claim, if it is a list. Non-string entries are ignored.
    pub fn permissions(&self) -> Option<Vec<&str>> {
        let list = self.get("permissions")?.as_array()?;
        Some(list.iter().filter_map(Value::as_str).collect())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
