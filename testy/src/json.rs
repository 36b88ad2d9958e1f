use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorDetails};

/// JSON shortcuts for anything serializable.
pub trait JsonExt: Serialize {
    /// Serializes to compact JSON.
    fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| {
            Error::new(ErrorDetails::Serialization {
                message: format!("Failed to serialize to JSON: {e}"),
            })
        })
    }

    /// Serializes to indented JSON.
    fn to_pretty_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::new(ErrorDetails::Serialization {
                message: format!("Failed to serialize to JSON: {e}"),
            })
        })
    }
}

impl<T: Serialize + ?Sized> JsonExt for T {}

/// Re-formats JSON text with indentation.
pub fn indent_json(json_text: &str) -> Result<String, Error> {
    let value: serde_json::Value = serde_json::from_str(json_text).map_err(|e| {
        Error::new(ErrorDetails::Serialization {
            message: format!("Failed to parse JSON: {e}"),
        })
    })?;
    value.to_pretty_json()
}

/// Deep-copies a value by serializing it and deserializing the result.
/// Handy for getting an independent copy of types that don't implement `Clone`.
pub fn json_clone<T: Serialize + DeserializeOwned>(value: &T) -> Result<T, Error> {
    let json = serde_json::to_value(value).map_err(|e| {
        Error::new(ErrorDetails::Serialization {
            message: format!("Failed to serialize to JSON: {e}"),
        })
    })?;
    serde_json::from_value(json).map_err(|e| {
        Error::new(ErrorDetails::Serialization {
            message: format!("Failed to deserialize JSON: {e}"),
        })
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Order {
        id: u32,
        lines: Vec<String>,
    }

    fn order() -> Order {
        Order {
            id: 7,
            lines: vec!["apple".to_string(), "pear".to_string()],
        }
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            order().to_json().unwrap(),
            r#"{"id":7,"lines":["apple","pear"]}"#
        );
    }

    #[test]
    fn test_to_pretty_json() {
        let pretty = order().to_pretty_json().unwrap();
        assert_eq!(
            pretty,
            "{\n  \"id\": 7,\n  \"lines\": [\n    \"apple\",\n    \"pear\"\n  ]\n}"
        );
    }

    #[test]
    fn test_indent_json() {
        assert_eq!(
            indent_json(r#"{"b":1,"a":[true]}"#).unwrap(),
            "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}"
        );
        let error = indent_json("{not json").unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse JSON"));
    }

    #[test]
    fn test_json_clone() {
        let original = order();
        let copy = json_clone(&original).unwrap();
        assert_eq!(copy, original);
    }
}
