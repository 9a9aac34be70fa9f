//! Deserializers for query strings, where empty values mean "not provided".

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Accepts `true`/`false`/`1`/`0` sent as strings (flattened query structs
/// hand every value over as a string).
pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        active: Option<bool>,
    }

    #[test]
    fn test_empty_values_are_none() {
        let q: Query = serde_json::from_str(r#"{"id":"","active":""}"#).unwrap();
        assert!(q.id.is_none());
        assert!(q.active.is_none());
    }

    #[test]
    fn test_values_parse() {
        let q: Query = serde_json::from_str(
            r#"{"id":"12345678-1234-1234-1234-123456789abc","active":"1"}"#,
        )
        .unwrap();
        assert!(q.id.is_some());
        assert_eq!(q.active, Some(true));
    }

    #[test]
    fn test_invalid_bool() {
        let q: Result<Query, _> = serde_json::from_str(r#"{"active":"maybe"}"#);
        assert!(q.is_err());
    }
}
