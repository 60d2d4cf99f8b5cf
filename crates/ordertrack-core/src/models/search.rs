use serde::{Deserialize, Deserializer, Serialize};

/// Category shown for results whose `type` is absent.
pub const FALLBACK_RESULT_TYPE: &str = "personal";

/// One customer match returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Opaque identifier; the endpoint may send it as a number or a string.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub code: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub phone: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl SearchResult {
    /// Result category, falling back to [`FALLBACK_RESULT_TYPE`].
    pub fn category(&self) -> &str {
        self.category_or(FALLBACK_RESULT_TYPE)
    }

    /// Result category, or `fallback` when the endpoint sent none.
    pub fn category_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.kind.as_deref() {
            Some(kind) if !kind.is_empty() => kind,
            _ => fallback,
        }
    }

    /// Secondary line shown under the name: `code · phone`.
    pub fn secondary(&self) -> String {
        format!("{} · {}", self.code, self.phone)
    }

    /// Detail page this result navigates to.
    pub fn detail_path(&self) -> String {
        customer_path(&self.id)
    }
}

/// `/customers/{id}/`
pub fn customer_path(id: &str) -> String {
    format!("/customers/{id}/")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Str(String),
}

fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Int(n) => n.to_string(),
        IdRepr::Str(s) => s,
    })
}

fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_string_ids() {
        let a: SearchResult =
            serde_json::from_str(r#"{"id": 42, "name": "John", "code": "C-1", "phone": "555"}"#)
                .unwrap();
        let b: SearchResult =
            serde_json::from_str(r#"{"id": "abc", "name": "Jane", "code": "C-2", "phone": "556"}"#)
                .unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(b.id, "abc");
        assert_eq!(a.detail_path(), "/customers/42/");
    }

    #[test]
    fn test_missing_type_falls_back() {
        let r: SearchResult =
            serde_json::from_str(r#"{"id": 1, "name": "Acme", "code": null, "phone": "1"}"#)
                .unwrap();
        assert_eq!(r.category(), "personal");
        assert_eq!(r.code, "");

        let r: SearchResult = serde_json::from_str(
            r#"{"id": 1, "name": "Acme", "code": "X", "phone": "1", "type": "company"}"#,
        )
        .unwrap();
        assert_eq!(r.category(), "company");
        assert_eq!(r.category_or("government"), "company");
        assert_eq!(r.secondary(), "X · 1");
    }

    #[test]
    fn test_configured_fallback() {
        let r: SearchResult = serde_json::from_str(
            r#"{"id": 5, "name": "Dept", "code": "G", "phone": "2", "type": ""}"#,
        )
        .unwrap();
        assert_eq!(r.category_or("government"), "government");
    }
}
