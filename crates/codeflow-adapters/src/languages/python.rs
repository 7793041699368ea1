//! Python adapters over `_type`-tagged AST JSON
//!
//! The tree is Python's own `ast` module dumped to JSON: each node is an
//! object whose `_type` names its class, with fields as properties.

use codeflow_core::{Family, GraphAccumulator, NodeRole};
use serde_json::Value;

use crate::adapter::AstAdapter;
use crate::walk::Slot;

fn py_type(value: &Value) -> Option<&str> {
    value.get("_type")?.as_str()
}

/// Child nodes found by scanning every property: `_type`-tagged objects,
/// and `_type`-tagged elements of arrays.
fn py_children(node: &Value) -> Vec<&Value> {
    let Some(fields) = node.as_object() else {
        return Vec::new();
    };
    let mut children = Vec::new();
    for value in fields.values() {
        match value {
            Value::Array(items) => children.extend(items.iter().filter(|v| py_type(v).is_some())),
            Value::Object(_) if py_type(value).is_some() => children.push(value),
            _ => {}
        }
    }
    children
}

/// One node per AST node, labeled with its class name.
pub struct PythonFullAdapter;

impl AstAdapter for PythonFullAdapter {
    type Node = Value;

    fn family(&self) -> Family {
        Family::Python
    }

    fn walk(&self, node: &Value, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        let Some(ty) = py_type(node) else {
            return;
        };
        let id = acc.attach(slot.parent, ty, NodeRole::for_depth(slot.depth), slot.hint());
        for (i, child) in py_children(node).into_iter().enumerate() {
            self.walk(child, Slot::child(Some(&id), slot.depth + 1, i), acc);
        }
    }
}

/// Function definitions, assignments and calls.
pub struct PythonConceptualAdapter;

impl PythonConceptualAdapter {
    fn concept(node: &Value, ty: &str) -> Option<(String, NodeRole)> {
        match ty {
            "FunctionDef" | "AsyncFunctionDef" => {
                let name = node.get("name").and_then(Value::as_str).unwrap_or("anonymous");
                Some((format!("[Function: {}]", name), NodeRole::Output))
            }
            "Assign" => {
                let target = node
                    .get("targets")
                    .and_then(|t| t.get(0))
                    .and_then(|t| t.get("id"))
                    .and_then(Value::as_str);
                Some((format!("[Variable: {}]", target.unwrap_or("...")), NodeRole::Default))
            }
            "Call" => {
                let func = node.get("func");
                let callee = func
                    .and_then(|f| f.get("id"))
                    .or_else(|| func.and_then(|f| f.get("attr")))
                    .and_then(Value::as_str);
                Some((format!("[Call: {}]", callee.unwrap_or("...")), NodeRole::Default))
            }
            _ => None,
        }
    }
}

impl AstAdapter for PythonConceptualAdapter {
    type Node = Value;

    fn family(&self) -> Family {
        Family::SimplePython
    }

    fn walk(&self, node: &Value, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        let Some(ty) = py_type(node) else {
            return;
        };
        let created = Self::concept(node, ty).map(|(label, role)| {
            let role = if role == NodeRole::Output { role } else { NodeRole::for_depth(slot.depth) };
            acc.attach(slot.parent, label, role, slot.hint())
        });
        let (parent, depth) = match &created {
            Some(id) => (Some(id.as_str()), slot.depth + 1),
            None => (slot.parent, slot.depth),
        };
        for (i, child) in py_children(node).into_iter().enumerate() {
            self.walk(child, Slot::child(parent, depth, i), acc);
        }
    }
}
