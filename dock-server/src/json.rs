//! Lenient JSON field helpers shared by the provider clients.

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// A number that may arrive bare (`40.1`) or quoted (`"40.1"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Numeric value, if the text form parses as a float.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Read a required float field, reporting what was wrong with it.
pub fn required_f64(field: &str, value: Option<&LooseNumber>) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("missing `{field}`"))?;
    value
        .to_f64()
        .ok_or_else(|| format!("`{field}` is not numeric: {value:?}"))
}

/// Deserialize `T` from `value`, which must be a JSON object.
///
/// Derived struct impls also accept an array in field order; this does not.
pub fn from_object<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Read an optional non-negative count, ignoring anything unusable.
pub fn optional_count(value: Option<&serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
