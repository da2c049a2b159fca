//! Serde model of a single `<name>.<method>.yaml` spec file.
//!
//! All keys are optional. Payload keys (`response`, `request`) record whether
//! the key was present at all, so `request: null` is distinguishable from a
//! missing `request` key.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level spec document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpecDocument {
    /// Fallback status for the route.
    pub status: Option<u16>,

    /// Conditional rules, evaluated in order.
    pub matches: Vec<MatchDocument>,

    /// Inline default response.
    #[serde(deserialize_with = "present")]
    pub response: Option<Value>,

    /// Default response file, relative to the spec file's directory.
    pub response_file: Option<PathBuf>,
}

/// One entry of the `matches` list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchDocument {
    /// Query-parameter condition. Scalar values are compared as strings.
    pub params: Option<BTreeMap<String, serde_yaml::Value>>,

    /// Inline expected request body.
    #[serde(deserialize_with = "present")]
    pub request: Option<Value>,

    pub request_file: Option<PathBuf>,

    /// Overrides the route status for this rule.
    pub status: Option<u16>,

    #[serde(deserialize_with = "present")]
    pub response: Option<Value>,

    pub response_file: Option<PathBuf>,
}

/// Parse a spec document. Empty and comment-only documents yield the default.
pub fn parse_document(content: &str) -> Result<SpecDocument, serde_yaml::Error> {
    let blank = content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'));
    if blank {
        return Ok(SpecDocument::default());
    }
    let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
    if raw.is_null() {
        return Ok(SpecDocument::default());
    }
    serde_yaml::from_value(raw)
}

/// Wraps any present value, including `null`, in `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// String form of a scalar YAML value used in `params`.
pub fn param_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_is_default() {
        for content in ["", "   \n", "# just a comment\n", "~"] {
            let doc = parse_document(content).unwrap();
            assert!(doc.status.is_none());
            assert!(doc.matches.is_empty());
            assert!(doc.response.is_none());
        }
    }

    #[test]
    fn test_full_document() {
        let doc = parse_document(
            r#"
status: 201
response: {"ok": true}
matches:
  - params: {fast: "true", limit: 10}
    status: 202
    response: {"queued": true}
  - request_file: payload.json
    response_file: created.json
"#,
        )
        .unwrap();

        assert_eq!(doc.status, Some(201));
        assert_eq!(doc.response, Some(json!({"ok": true})));
        assert_eq!(doc.matches.len(), 2);

        let first = &doc.matches[0];
        let params = first.params.as_ref().unwrap();
        assert_eq!(param_string(&params["fast"]).as_deref(), Some("true"));
        assert_eq!(param_string(&params["limit"]).as_deref(), Some("10"));
        assert_eq!(first.status, Some(202));
        assert_eq!(first.response, Some(json!({"queued": true})));

        let second = &doc.matches[1];
        assert!(second.request.is_none());
        assert_eq!(second.request_file, Some(PathBuf::from("payload.json")));
        assert_eq!(second.response_file, Some(PathBuf::from("created.json")));
    }

    #[test]
    fn test_explicit_null_is_present() {
        let doc = parse_document("matches:\n  - request: null\n    response: null\n").unwrap();
        assert_eq!(doc.matches[0].request, Some(Value::Null));
        assert_eq!(doc.matches[0].response, Some(Value::Null));

        let doc = parse_document("matches:\n  - status: 500\n").unwrap();
        assert_eq!(doc.matches[0].request, None);
    }

    #[test]
    fn test_non_mapping_document_is_rejected() {
        assert!(parse_document("- just\n- a list\n").is_err());
        assert!(parse_document("status: [oops").is_err());
    }

    #[test]
    fn test_param_string_rejects_non_scalars() {
        assert_eq!(param_string(&serde_yaml::Value::Bool(true)).as_deref(), Some("true"));
        assert!(param_string(&serde_yaml::Value::Null).is_none());
        assert!(param_string(&serde_yaml::Value::Sequence(vec![])).is_none());
    }
}
