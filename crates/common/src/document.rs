// Opaque configuration document.
//
// The on-disk schema belongs to the configuration subsystem; the
// bridge only needs to prove a payload is a well-formed JSON object
// before accepting it, and to hand the parsed form onward.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A parsed configuration document. Always a JSON object at the top
/// level; field meaning is owned elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ConfigDocument(Value);

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("config document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("config document must be a JSON object")]
    NotAnObject,
}

impl ConfigDocument {
    /// Parse raw JSON text. Rejects anything whose top level is not
    /// an object, matching what the configuration subsystem persists.
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(DocumentError::NotAnObject);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        // Serializing a Value that was parsed from JSON cannot fail.
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<serde_json::Map<String, Value>> for ConfigDocument {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_well_formed_object() {
        let doc = ConfigDocument::from_json(r#"{"hidden":["com.example.app"],"version":3}"#)
            .expect("object should parse");
        assert_eq!(doc.as_value()["version"], json!(3));
    }

    #[test]
    fn round_trips_through_json_text() {
        let doc = ConfigDocument::from_json(r#"{"a":{"b":[1,2,3]}}"#).unwrap();
        let again = ConfigDocument::from_json(&doc.to_json()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            ConfigDocument::from_json("{not json"),
            Err(DocumentError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_non_object_top_level() {
        for raw in ["[1,2]", "\"text\"", "42", "null", "true"] {
            assert!(matches!(
                ConfigDocument::from_json(raw),
                Err(DocumentError::NotAnObject)
            ));
        }
    }
}
