//! Extraction of raw `uses` references from manifest documents
//!
//! Workflows keep their steps under `jobs`, composite actions under `runs`.
//! The walk is depth-first and keeps discovery order:
//!
//! - a mapping with a `uses` key contributes that value and is not descended into
//! - a mapping with a `steps` key is descended into through `steps` only
//! - any other mapping is descended into through every value
//! - sequences are descended into element by element
//!
//! This tolerates arbitrary job-level fields (`with`, `env`, matrices) without
//! picking up false positives, while still finding steps nested at any depth.

use std::collections::HashSet;

use crate::document::Node;

/// Collect the `uses` strings of a parsed manifest, deduplicated by first occurrence.
///
/// The walk starts at the `jobs` value when the root has that key, otherwise
/// at `runs`. Documents with neither, and non-mapping roots, yield nothing.
pub fn references_in_manifest(document: &Node) -> Vec<String> {
    let root = document.get("jobs").or_else(|| document.get("runs"));
    let Some(root) = root else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    extract_references(root)
        .into_iter()
        .filter(|reference| seen.insert(reference.clone()))
        .collect()
}

/// Recursively collect `uses` strings below `node`, in document order.
///
/// A `uses` value that is not a string still stops the descent but
/// contributes nothing.
pub fn extract_references(node: &Node) -> Vec<String> {
    match node {
        Node::Mapping(entries) => {
            if let Some(uses) = node.get("uses") {
                uses.as_str().map(str::to_string).into_iter().collect()
            } else if let Some(steps) = node.get("steps") {
                extract_references(steps)
            } else {
                entries
                    .iter()
                    .flat_map(|(_, value)| extract_references(value))
                    .collect()
            }
        }
        Node::Sequence(items) => items.iter().flat_map(extract_references).collect(),
        Node::Scalar(_) | Node::Null => Vec::new(),
    }
}
