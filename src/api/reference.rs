use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Pointer to another resource as the API happens to render it: either a
/// bare number or a string with the number embedded somewhere in it
/// (`"o-10"`, `"/api/orders/10/"`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reference {
    Numeric(i64),
    Embedded(String),
}

impl Reference {
    /// Canonical numeric id of the referenced resource.
    ///
    /// Embedded strings yield the last run of ASCII digits, so
    /// `"/api/v2/orders/482/"` resolves to `482`.
    pub fn normalize(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Embedded(s) => s
                .rsplit(|c: char| !c.is_ascii_digit())
                .find(|run| !run.is_empty())
                .and_then(|digits| digits.parse().ok()),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| {
                            f.fract() == 0.0 && f.abs() < i64::MAX as f64
                        })
                        .map(|f| f as i64)
                })
                .map(Self::Numeric),
            Value::String(s) => Some(Self::Embedded(s)),
            _ => None,
        }
    }
}

impl From<i64> for Reference {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for Reference {
    fn from(value: &str) -> Self {
        Self::Embedded(value.to_owned())
    }
}

pub fn normalize(reference: Option<&Reference>) -> Option<i64> {
    reference.and_then(Reference::normalize)
}

/// Deserializes a reference field without ever failing on its shape:
/// anything other than an integral number or a string is an absent
/// reference.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<Reference>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Reference::from_value)
}
