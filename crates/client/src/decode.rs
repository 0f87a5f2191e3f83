// crates/client/src/decode.rs
//! Unwraps the backend's double-encoded summary payload.
//!
//! The worker stores its serialized summary as a string and the read path
//! re-serializes that string, so the payload reaching the client is a JSON
//! string whose content is itself JSON text. Reaching the object takes two
//! passes: parse #1 yields the intermediate string, parse #2 yields the
//! structure. The shape is part of the backend contract; a single-decode
//! "fix" here would silently diverge from it.

use serde_json::Value;
use thiserror::Error;

use podsum_types::SummaryData;

/// Which decode pass failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Parse #1: raw payload into the intermediate string.
    Outer,
    /// Parse #2: intermediate string into the structured summary.
    Inner,
}

/// Failure while unwrapping a summary payload. Never panics past this
/// boundary; every malformed input maps to a variant.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Summary payload is not valid JSON: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },

    /// The outer payload parsed, but to something other than the expected
    /// string of JSON text. A single-encoded object lands here.
    #[error("Summary payload decodes to {found}, expected a string of JSON text")]
    NotString { found: &'static str },

    #[error("Summary text does not parse as a structured summary: {source}")]
    Structure {
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// The pass at which decoding failed. `NotString` counts as the second
    /// pass: the first parse succeeded, re-parsing its value is what has no
    /// way forward.
    pub fn stage(&self) -> DecodeStage {
        match self {
            DecodeError::Malformed { .. } => DecodeStage::Outer,
            DecodeError::NotString { .. } | DecodeError::Structure { .. } => DecodeStage::Inner,
        }
    }
}

/// Decodes a double-encoded summary payload into [`SummaryData`].
pub fn decode_summary(raw: &str) -> Result<SummaryData, DecodeError> {
    let outer: Value =
        serde_json::from_str(raw).map_err(|source| DecodeError::Malformed { source })?;
    let inner = match &outer {
        Value::String(text) => text,
        other => {
            return Err(DecodeError::NotString {
                found: json_type_name(other),
            })
        }
    };
    serde_json::from_str(inner).map_err(|source| DecodeError::Structure { source })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Serializes `value`, then serializes the resulting text again, which is
    /// exactly the shape the backend emits.
    fn double_encode(value: serde_json::Value) -> String {
        serde_json::to_string(&value.to_string()).unwrap()
    }

    #[test]
    fn test_double_encoded_payload_decodes() {
        let raw = double_encode(serde_json::json!({"summary": "x"}));
        let data = decode_summary(&raw).unwrap();
        assert_eq!(data.summary.as_deref(), Some("x"));
        assert_eq!(
            data,
            SummaryData {
                summary: Some("x".to_string()),
                ..SummaryData::default()
            }
        );
    }

    #[test]
    fn test_empty_object_is_a_valid_decode() {
        let raw = double_encode(serde_json::json!({}));
        let data = decode_summary(&raw).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_nested_sections_survive_both_passes() {
        let raw = double_encode(serde_json::json!({
            "summary": "ferries",
            "bulletPoints": ["a", "b"],
            "qna": [{"question": "when?", "answer": "noon"}],
            "namedEntities": {"people": ["Ada"]}
        }));
        let data = decode_summary(&raw).unwrap();
        assert_eq!(data.bullet_points.as_deref().unwrap().len(), 2);
        assert_eq!(
            data.qna.as_deref().unwrap()[0].answer.as_deref(),
            Some("noon")
        );
        assert_eq!(data.named_entities.unwrap().people, vec!["Ada"]);
    }

    #[test]
    fn test_garbage_fails_at_stage_one() {
        let err = decode_summary("definitely not json").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
        assert_eq!(err.stage(), DecodeStage::Outer);
    }

    #[test]
    fn test_single_encoded_object_fails_at_stage_two() {
        // One level of encoding only: parse #1 yields an object, not the
        // intermediate string, so the second pass is where it dies.
        let raw = serde_json::json!({"summary": "x"}).to_string();
        let err = decode_summary(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::NotString { found: "an object" }));
        assert_eq!(err.stage(), DecodeStage::Inner);
    }

    #[test]
    fn test_double_encoded_garbage_fails_at_stage_two() {
        // Valid outer string, but its content is not JSON.
        let raw = serde_json::to_string("{not json").unwrap();
        let err = decode_summary(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::Structure { .. }));
        assert_eq!(err.stage(), DecodeStage::Inner);
    }

    #[test]
    fn test_double_encoded_non_object_fails_at_stage_two() {
        let raw = double_encode(serde_json::json!([1, 2, 3]));
        let err = decode_summary(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::Structure { .. }));
        assert_eq!(err.stage(), DecodeStage::Inner);
    }

    #[test]
    fn test_outer_number_reports_found_type() {
        let err = decode_summary("42").unwrap_err();
        assert!(matches!(err, DecodeError::NotString { found: "a number" }));
    }
}
