use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::principal::Role;

/// Verified token claims, normalized.
///
/// Produced only by a [`TokenVerifier`](crate::TokenVerifier); holding one means the
/// signature and expiry already checked out.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    /// Subject (`sub`), always a UUID.
    pub subject: Uuid,

    /// Expiration (`exp`)
    pub expires_at: OffsetDateTime,

    /// Issuer (`iss`), if present
    pub issuer: Option<String>,

    /// Audiences (`aud`), normalized to a list
    pub audiences: Vec<String>,

    /// Role (`role`), `User` when absent
    pub role: Role,

    pub email: Option<String>,

    /// The full verified claim set, including the ones above.
    pub extras: Map<String, Value>,
}

/// Normalize `aud`, which may be a string or an array of strings.
pub(crate) fn audiences_of(raw: &Map<String, Value>) -> Vec<String> {
    match raw.get("aud") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(ToOwned::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn audience_string_becomes_single_item() {
        let raw = map(json!({"aud": "authenticated"}));
        assert_eq!(audiences_of(&raw), vec!["authenticated".to_owned()]);
    }

    #[test]
    fn audience_array_keeps_strings_only() {
        let raw = map(json!({"aud": ["a", 1, "b"]}));
        assert_eq!(audiences_of(&raw), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn missing_audience_is_empty() {
        assert!(audiences_of(&Map::new()).is_empty());
    }
}
