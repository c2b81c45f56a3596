use serde::Deserialize;
use serde::de::Error as DeError;
use serde_json::value::RawValue;

/// Decimal value sent by the API as either JSON string or JSON number.
///
/// For numbers, the raw JSON token is preserved to avoid formatting drift
/// (`10.00` remains `"10.00"` instead of becoming `"10.0"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDecimal(String);

impl TransportDecimal {
    /// Read a JSON string or number token; any other token yields `None`.
    pub fn from_raw(raw: &RawValue) -> Option<Self> {
        let token = raw.get();
        match token.as_bytes().first().copied() {
            Some(b'"') => serde_json::from_str::<String>(token).ok().map(Self),
            Some(b'-' | b'0'..=b'9') => Some(Self(token.to_owned())),
            _ => None,
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<RawValue> = Deserialize::deserialize(deserializer)?;
        Self::from_raw(&raw).ok_or_else(|| {
            D::Error::custom("expected decimal field to be JSON string or number")
        })
    }
}

/// Counter sent as integer, float or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransportCount {
    Int(u64),
    Float(f64),
    String(String),
}

impl TransportCount {
    pub fn into_u64(self) -> Option<u64> {
        match self {
            Self::Int(value) => Some(value),
            // Saturating cast: negative and NaN become 0.
            Self::Float(value) => Some(value as u64),
            Self::String(value) => value.trim().parse::<u64>().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        value: TransportDecimal,
    }

    #[test]
    fn decimal_preserves_numeric_token() {
        let parsed: Wrapper = serde_json::from_str(r#"{"value": 12.50}"#).unwrap();
        assert_eq!(parsed.value.into_string(), "12.50");

        let parsed: Wrapper = serde_json::from_str(r#"{"value": "0.001"}"#).unwrap();
        assert_eq!(parsed.value.into_string(), "0.001");

        assert!(serde_json::from_str::<Wrapper>(r#"{"value": true}"#).is_err());
    }

    #[test]
    fn count_accepts_int_float_and_string() {
        let parse = |json: &str| serde_json::from_str::<TransportCount>(json).unwrap().into_u64();
        assert_eq!(parse("42"), Some(42));
        assert_eq!(parse("42.9"), Some(42));
        assert_eq!(parse("-3"), Some(0));
        assert_eq!(parse(r#"" 7 ""#), Some(7));
        assert_eq!(parse(r#""n/a""#), None);
    }
}
