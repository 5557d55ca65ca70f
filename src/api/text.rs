use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a free-form display field. Strings are kept as they are,
/// `null` is absent, and any other value is kept as its JSON text.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
