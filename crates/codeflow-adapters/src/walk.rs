//! Shared tree-walk bookkeeping
//!
//! Every adapter performs the same depth-first, pre-order, left-to-right
//! descent. What differs is how a family finds the children of a node and
//! whether a node materializes. The helpers here cover the first part for
//! the JSON-shaped trees (JS-family, CSS, Java CST, Python).

use codeflow_core::LayoutHint;
use serde_json::Value;

/// Where the walk currently stands: the effective parent to attach to, and
/// the layout slot the next materialized node will occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    pub parent: Option<&'a str>,
    pub depth: usize,
    pub sibling_index: usize,
}

impl<'a> Slot<'a> {
    pub fn root() -> Self {
        Slot {
            parent: None,
            depth: 0,
            sibling_index: 0,
        }
    }

    pub fn hint(&self) -> LayoutHint {
        LayoutHint {
            depth: self.depth,
            sibling_index: self.sibling_index,
        }
    }

    /// Slot for the `index`-th child below `parent`.
    pub fn child(parent: Option<&'a str>, depth: usize, index: usize) -> Self {
        Slot {
            parent,
            depth,
            sibling_index: index,
        }
    }
}

/// The `type` discriminator of an ESTree/Babel or css-tree node.
pub fn node_type(value: &Value) -> Option<&str> {
    value.get("type")?.as_str()
}

/// `node[key].name`, e.g. the name of an `Identifier` held under `id`.
pub fn name_under<'v>(node: &'v Value, key: &str) -> Option<&'v str> {
    node.get(key)?.get("name")?.as_str()
}

/// Children stored under `key`: every typed element of an array, or the
/// value itself when it is a single typed object. Untyped values, nulls and
/// primitives contribute nothing.
pub fn typed_children<'v>(
    node: &'v Value,
    key: &str,
    is_node: fn(&Value) -> bool,
) -> Vec<&'v Value> {
    match node.get(key) {
        Some(Value::Array(items)) => items.iter().filter(|v| is_node(v)).collect(),
        Some(child) if child.is_object() && is_node(child) => vec![child],
        _ => Vec::new(),
    }
}

/// Object carrying a `type` string.
pub fn has_type(value: &Value) -> bool {
    node_type(value).is_some()
}

/// Render a scalar JSON value the way it reads in source.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
