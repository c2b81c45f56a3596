//! Field-level decoders that never fail on a wrong-typed value.
//!
//! The API is loosely typed; a field holding an unexpected JSON type is treated as
//! absent so the caller's default applies.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use super::number::TransportDecimal;
use crate::domain::Metadata;

/// Deserialize an optional field, mapping `null` and wrong-typed values to `None`.
///
/// Use with `#[serde(default, deserialize_with = "lenient")]`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// Deserialize an array, skipping entries that do not decode. Non-arrays are empty.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Like [`lenient`] for decimals, keeping the raw numeric token.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<TransportDecimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Box<RawValue> = Deserialize::deserialize(deserializer)?;
    Ok(TransportDecimal::from_raw(&raw))
}

/// Deserialize an optional metadata object, treating `null` and non-objects as empty.
///
/// String values are kept as-is; any other JSON value is kept as its JSON text.
pub fn lenient_metadata<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Object(map)) = value else {
        return Ok(Metadata::new());
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(text) => (key, text),
            other => (key, other.to_string()),
        })
        .collect())
}
