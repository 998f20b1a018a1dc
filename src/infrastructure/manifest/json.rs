//! JSON manifest decoder
//!
//! `serde_json` is built with `preserve_order`, so object entries keep the
//! order they have in the document.

use serde_json::Value;

use crate::domain::ports::{DecodeError, ManifestDecoder};
use crate::domain::value_objects::ManifestNode;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestDecoder;

impl JsonManifestDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestDecoder for JsonManifestDecoder {
    fn decode(&self, text: &str) -> Result<ManifestNode, DecodeError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let value: Value = serde_json::from_str(text).map_err(|e| DecodeError(e.to_string()))?;
        Ok(to_node(value))
    }
}

fn to_node(value: Value) -> ManifestNode {
    match value {
        Value::Object(map) => {
            ManifestNode::Object(map.into_iter().map(|(k, v)| (k, to_node(v))).collect())
        }
        Value::Array(items) => ManifestNode::Array(items.into_iter().map(to_node).collect()),
        Value::String(s) => ManifestNode::String(s),
        Value::Number(n) => ManifestNode::String(n.to_string()),
        Value::Bool(b) => ManifestNode::String(b.to_string()),
        Value::Null => ManifestNode::Null,
    }
}
