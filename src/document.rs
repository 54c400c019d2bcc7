//! Generic manifest documents
//!
//! Workflow and composite action manifests are only loosely schematized, so
//! they are loaded into an untyped tree of mappings, sequences and scalars
//! rather than into fixed structs. YAML is read with `serde_yaml` and then
//! narrowed to the small set of node kinds the extractor understands.

use serde_yaml::Value;

use crate::error::DocumentError;

/// A node of a parsed manifest
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Key/value pairs in document order
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    Scalar(Scalar),
    Null,
}

/// Scalar values permitted inside a manifest
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Bool(bool),
    /// Numbers keep their textual form; nothing downstream does arithmetic
    Number(String),
}

impl Node {
    /// Look up `key` in a mapping node
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The string value of a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Parse manifest text into a [`Node`] tree.
///
/// Empty documents (including comment-only ones) yield [`Node::Null`].
/// Explicitly tagged values are rejected, as are aliases to unknown anchors.
/// YAML merge keys (`<<`) are applied before conversion.
pub fn parse_document(content: &str) -> Result<Node, DocumentError> {
    if is_blank_document(content) {
        return Ok(Node::Null);
    }

    let mut value: Value = serde_yaml::from_str(content).map_err(classify_yaml_error)?;
    value.apply_merge().map_err(classify_yaml_error)?;

    convert(value)
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" || trimmed == "..."
    })
}

fn classify_yaml_error(err: serde_yaml::Error) -> DocumentError {
    let message = err.to_string();
    if message.contains("anchor") || message.contains("alias") {
        DocumentError::MalformedAlias(message)
    } else {
        DocumentError::Syntax(message)
    }
}

fn convert(value: Value) -> Result<Node, DocumentError> {
    match value {
        Value::Null => Ok(Node::Null),
        Value::Bool(b) => Ok(Node::Scalar(Scalar::Bool(b))),
        Value::Number(n) => Ok(Node::Scalar(Scalar::Number(n.to_string()))),
        Value::String(s) => Ok(Node::Scalar(Scalar::String(s))),
        Value::Sequence(items) => items
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Sequence),
        Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, value) in mapping {
                entries.push((key_to_string(key)?, convert(value)?));
            }
            Ok(Node::Mapping(entries))
        }
        Value::Tagged(tagged) => Err(DocumentError::DisallowedType {
            tag: tagged.tag.to_string(),
        }),
    }
}

fn key_to_string(key: Value) -> Result<String, DocumentError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        Value::Tagged(tagged) => Err(DocumentError::DisallowedType {
            tag: tagged.tag.to_string(),
        }),
        Value::Sequence(_) | Value::Mapping(_) => Err(DocumentError::Syntax(
            "complex mapping keys are not supported".to_string(),
        )),
    }
}
