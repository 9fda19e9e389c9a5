use serde_json::{Map, Value};

/// Placeholder for a serialized node that could not be decoded.
///
/// Keeps the raw JSON (children included) so saving the document again
/// writes the node back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownNode {
    raw: Map<String, Value>,
    reason: String,
}

impl UnknownNode {
    pub fn new(raw: Map<String, Value>, reason: impl Into<String>) -> Self {
        Self {
            raw,
            reason: reason.into(),
        }
    }

    /// Type tag as written in the source document
    pub fn original_type(&self) -> &str {
        self.raw.get("type").and_then(Value::as_str).unwrap_or("unknown")
    }

    pub fn original_version(&self) -> u64 {
        self.raw.get("version").and_then(Value::as_u64).unwrap_or(0)
    }

    /// Why decoding failed
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reports_original_header() {
        let raw = json!({"type": "youtube", "version": 3, "videoID": "x"});
        let node = UnknownNode::new(raw.as_object().unwrap().clone(), "Unknown node type: youtube");
        assert_eq!(node.original_type(), "youtube");
        assert_eq!(node.original_version(), 3);
        assert_eq!(node.raw().get("videoID"), Some(&json!("x")));
    }
}
