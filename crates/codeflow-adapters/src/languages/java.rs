//! Java adapters over java-parser style concrete syntax trees
//!
//! A CST node is `{ "name": <production>, "children": { <key>: [..] } }`;
//! tokens are `{ "image": <text>, .. }` and carry no `name`.

use codeflow_core::{Family, GraphAccumulator, NodeRole};
use serde_json::Value;

use crate::adapter::AstAdapter;
use crate::walk::Slot;

const CLASS_NAME: &[&str] = &["typeIdentifier", "Identifier"];
const SUPERCLASS: &[&str] = &["superclass", "classOrInterfaceType", "Identifier"];
const FIELD_NAME: &[&str] = &["variableDeclaratorList", "variableDeclarator", "variableDeclaratorId", "Identifier"];
const METHOD_NAME: &[&str] = &["methodHeader", "methodDeclarator", "Identifier"];
const LOCAL_NAME: &[&str] = &[
    "localVariableDeclaration",
    "variableDeclaratorList",
    "variableDeclarator",
    "variableDeclaratorId",
    "Identifier",
];
const INVOKED_NAME: &[&str] = &["methodName", "Identifier"];

/// Every object in every array of the `children` record, in key order.
fn cst_children(node: &Value) -> impl Iterator<Item = &Value> {
    node.get("children")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|children| children.values())
        .filter_map(Value::as_array)
        .flatten()
        .filter(|child| child.is_object())
}

/// Follow `children.<step>[0]` for each step, then read the token image.
fn image_at<'v>(node: &'v Value, path: &[&str]) -> Option<&'v str> {
    let mut at = node;
    for step in path {
        at = at.get("children")?.get(*step)?.get(0)?;
    }
    at.get("image")?.as_str()
}

fn production(node: &Value) -> Option<&str> {
    node.get("name")?.as_str()
}

/// One node per CST element, labeled with its production name.
pub struct JavaFullAdapter;

impl AstAdapter for JavaFullAdapter {
    type Node = Value;

    fn family(&self) -> Family {
        Family::Java
    }

    fn walk(&self, node: &Value, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        if !node.is_object() {
            return;
        }
        let label = production(node).unwrap_or("node");
        let id = acc.attach(slot.parent, label, NodeRole::for_depth(slot.depth), slot.hint());

        for (i, child) in cst_children(node).enumerate() {
            self.walk(child, Slot::child(Some(&id), slot.depth + 1, i), acc);
        }
    }
}

/// Scope a conceptual Java walk carries downwards. Never mutated; entering
/// a class or method produces a new value.
#[derive(Debug, Clone)]
struct Scope {
    class_id: Option<String>,
    parent_id: Option<String>,
    depth: usize,
}

impl Scope {
    fn entered(&self, id: &str, depth: usize, class: bool) -> Scope {
        Scope {
            class_id: if class { Some(id.to_string()) } else { self.class_id.clone() },
            parent_id: Some(id.to_string()),
            depth,
        }
    }
}

/// Classes, fields, methods, local variables and method calls.
///
/// Classes are laid out as separate roots side by side; the running class
/// count is returned from each visit so later classes see it.
pub struct JavaConceptualAdapter;

enum Visit {
    /// Node materialized and its subtree is summarized by it.
    Leaf,
    /// Continue into the children under this scope.
    Descend(Scope),
}

impl JavaConceptualAdapter {
    fn visit(&self, node: &Value, scope: &Scope, sibling_index: usize, mut classes: usize, acc: &mut GraphAccumulator) -> usize {
        let at = |depth: usize| Slot::child(None, depth, sibling_index).hint();

        let outcome = match production(node) {
            Some("normalClassDeclaration") => image_at(node, CLASS_NAME).map(|name| {
                let mut label = format!("[Class: {}]", name);
                if let Some(parent) = image_at(node, SUPERCLASS) {
                    label.push_str(&format!(" extends {}", parent));
                }
                let hint = Slot::child(None, 0, classes).hint();
                let id = acc.attach(None, label, NodeRole::Input, hint);
                classes += 1;
                Visit::Descend(scope.entered(&id, 1, true))
            }),
            Some("fieldDeclaration") => match (image_at(node, FIELD_NAME), &scope.class_id) {
                (Some(name), Some(class_id)) => {
                    acc.attach(Some(class_id), format!("[Field: {}]", name), NodeRole::Default, at(scope.depth));
                    Some(Visit::Leaf)
                }
                _ => None,
            },
            Some("methodDeclaration") => match (image_at(node, METHOD_NAME), &scope.class_id) {
                (Some(name), Some(class_id)) => {
                    let id = acc.attach(Some(class_id), format!("[Method: {}]", name), NodeRole::Default, at(scope.depth));
                    Some(Visit::Descend(scope.entered(&id, scope.depth + 1, false)))
                }
                _ => None,
            },
            Some("localVariableDeclarationStatement") => match (image_at(node, LOCAL_NAME), &scope.parent_id) {
                (Some(name), Some(parent)) => {
                    acc.attach(Some(parent), format!("[Variable: {}]", name), NodeRole::Default, at(scope.depth));
                    Some(Visit::Leaf)
                }
                _ => None,
            },
            Some("methodInvocation") => {
                let name = image_at(node, INVOKED_NAME).or_else(|| image_at(node, &["Identifier"]));
                match (name, &scope.parent_id) {
                    (Some(name), Some(parent)) => {
                        acc.attach(Some(parent), format!("[Call: {}]", name), NodeRole::Default, at(scope.depth));
                        Some(Visit::Leaf)
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        let inner = match outcome {
            Some(Visit::Leaf) => return classes,
            Some(Visit::Descend(inner)) => inner,
            None => scope.clone(),
        };
        for (i, child) in cst_children(node).enumerate() {
            classes = self.visit(child, &inner, i, classes, acc);
        }
        classes
    }
}

impl AstAdapter for JavaConceptualAdapter {
    type Node = Value;

    fn family(&self) -> Family {
        Family::SimpleJava
    }

    fn walk(&self, node: &Value, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        let scope = Scope {
            class_id: None,
            parent_id: slot.parent.map(str::to_string),
            depth: slot.depth,
        };
        let classes = self.visit(node, &scope, slot.sibling_index, 0, acc);
        tracing::trace!(classes, "java walk finished");
    }
}
