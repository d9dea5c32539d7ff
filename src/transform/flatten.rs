//! Compressed-tree decoder: zlib-inflate a payload, parse it as a nested
//! JSON tree, and flatten every root-to-leaf path into one delimited line.
//!
//! Example: `{"a":{"b":{"c":1,"d":2}}}` with delimiter `,` becomes
//! `["a,b,c,1", "a,b,d,2"]`, in key-enumeration order of the input.

use crate::errors::ForwarderError;
use crate::transform::Decoder;
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use serde_json::Value;
use std::io::Read;

pub struct TreeDecoder {
    delimiter: String,
}

impl TreeDecoder {
    pub fn new() -> Self {
        Self::with_delimiter(",")
    }

    pub fn with_delimiter(delimiter: &str) -> Self {
        Self {
            delimiter: delimiter.to_string(),
        }
    }
}

impl Default for TreeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Decoder for TreeDecoder {
    async fn decode(&self, payload: &Bytes) -> Result<Vec<Bytes>, ForwarderError> {
        let tree = inflate_json(payload)?;
        let lines = flatten_tree(&tree, &self.delimiter)?;
        Ok(lines.into_iter().map(Bytes::from).collect())
    }
}

fn inflate_json(payload: &[u8]) -> Result<Value, ForwarderError> {
    let mut buf = Vec::new();
    ZlibDecoder::new(payload)
        .read_to_end(&mut buf)
        .map_err(|e| ForwarderError::Decode(format!("inflate: {e}")))?;
    serde_json::from_slice(&buf).map_err(|e| ForwarderError::Decode(format!("json: {e}")))
}

/// Flatten a nested tree into delimiter-joined path/value lines, one per
/// leaf, in key-enumeration order. The top level must be an object.
pub fn flatten_tree(tree: &Value, delimiter: &str) -> Result<Vec<String>, ForwarderError> {
    if !tree.is_object() {
        return Err(ForwarderError::Decode(
            "top-level payload must be an object".into(),
        ));
    }
    let mut out = Vec::new();
    let mut path: Vec<String> = Vec::new();
    walk(tree, delimiter, &mut path, &mut out);
    Ok(out)
}

fn walk(node: &Value, delimiter: &str, path: &mut Vec<String>, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk(child, delimiter, path, out);
                path.pop();
            }
        }
        // Arrays branch on the element index, mirroring object traversal.
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                path.push(idx.to_string());
                walk(child, delimiter, path, out);
                path.pop();
            }
        }
        leaf => {
            out.push(format!(
                "{}{}{}",
                path.join(delimiter),
                delimiter,
                leaf_text(leaf)
            ));
        }
    }
}

fn leaf_text(leaf: &Value) -> String {
    match leaf {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
