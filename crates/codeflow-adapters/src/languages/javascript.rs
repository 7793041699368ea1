//! JavaScript / TypeScript / JSX adapters over Babel-shaped trees

use codeflow_core::{Family, GraphAccumulator, NodeRole};
use serde_json::Value;

use super::visitor_keys::VisitorKeys;
use crate::adapter::AstAdapter;
use crate::walk::{has_type, name_under, node_type, scalar_text, typed_children, Slot};

/// Keys skipped by the conceptual walk: the name they hold is already in
/// the owning node's label.
const CONCEPTUAL_SKIP: &[&str] = &["id", "callee"];

/// Child nodes of `node` in visitor-key order, or `None` when the table
/// has no entry for its type.
fn children<'v>(keys: &VisitorKeys, node: &'v Value, ty: &str, skip: &[&str]) -> Option<Vec<&'v Value>> {
    let keys = keys.keys_for(ty)?;
    Some(
        keys.iter()
            .filter(|k| !skip.contains(&k.as_str()))
            .flat_map(|k| typed_children(node, k, has_type))
            .collect(),
    )
}

/// One graph node per AST node.
pub struct JsFullAdapter<'k> {
    keys: &'k VisitorKeys,
}

impl<'k> JsFullAdapter<'k> {
    pub fn new(keys: &'k VisitorKeys) -> Self {
        JsFullAdapter { keys }
    }

    fn label(node: &Value, ty: &str) -> String {
        match ty {
            "Identifier" => format!("Identifier: {}", node.get("name").map(scalar_text).unwrap_or_default()),
            "NumericLiteral" | "StringLiteral" => {
                format!("{}: {}", ty, node.get("value").map(scalar_text).unwrap_or_default())
            }
            _ => ty.to_string(),
        }
    }
}

impl AstAdapter for JsFullAdapter<'_> {
    type Node = Value;

    fn family(&self) -> Family {
        Family::Js
    }

    fn walk(&self, node: &Value, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        let Some(ty) = node_type(node) else {
            return;
        };
        let id = acc.attach(slot.parent, Self::label(node, ty), NodeRole::for_depth(slot.depth), slot.hint());

        let Some(children) = children(self.keys, node, ty, &[]) else {
            return;
        };
        for (i, child) in children.into_iter().enumerate() {
            self.walk(child, Slot::child(Some(&id), slot.depth + 1, i), acc);
        }
    }
}

/// Functions, classes, variables and calls only; everything else is
/// transparent and hands its parent through to its children.
pub struct JsConceptualAdapter<'k> {
    keys: &'k VisitorKeys,
}

impl<'k> JsConceptualAdapter<'k> {
    pub fn new(keys: &'k VisitorKeys) -> Self {
        JsConceptualAdapter { keys }
    }

    fn concept(node: &Value, ty: &str) -> Option<(String, NodeRole)> {
        match ty {
            "FunctionDeclaration" => Some((
                format!("[Function: {}]", name_under(node, "id").unwrap_or("anonymous")),
                NodeRole::Output,
            )),
            "ClassDeclaration" => Some((
                format!("[Class: {}]", name_under(node, "id").unwrap_or("anonymous")),
                NodeRole::Output,
            )),
            "VariableDeclarator" => Some((
                format!("[Variable: {}]", name_under(node, "id").unwrap_or("...")),
                NodeRole::Default,
            )),
            "CallExpression" => Some((
                format!("[Call: {}]", name_under(node, "callee").unwrap_or("...")),
                NodeRole::Default,
            )),
            _ => None,
        }
    }
}

impl AstAdapter for JsConceptualAdapter<'_> {
    type Node = Value;

    fn family(&self) -> Family {
        Family::SimpleJs
    }

    fn walk(&self, node: &Value, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        let Some(ty) = node_type(node) else {
            return;
        };

        // The declaration wrapper never materializes: each declarator takes
        // its place under the same parent. A table without its
        // `declarations` key ends the walk here, as in full mode.
        if ty == "VariableDeclaration" {
            let walks_declarations = self
                .keys
                .keys_for(ty)
                .is_some_and(|keys| keys.iter().any(|k| k == "declarations"));
            if !walks_declarations {
                return;
            }
            for (i, declarator) in typed_children(node, "declarations", has_type).into_iter().enumerate() {
                let at = Slot::child(slot.parent, slot.depth, slot.sibling_index + i);
                self.walk(declarator, at, acc);
            }
            return;
        }

        let created = Self::concept(node, ty).map(|(label, role)| {
            let role = if role == NodeRole::Output { role } else { NodeRole::for_depth(slot.depth) };
            acc.attach(slot.parent, label, role, slot.hint())
        });
        let (parent, depth) = match &created {
            Some(id) => (Some(id.as_str()), slot.depth + 1),
            None => (slot.parent, slot.depth),
        };

        let Some(children) = children(self.keys, node, ty, CONCEPTUAL_SKIP) else {
            return;
        };
        for (i, child) in children.into_iter().enumerate() {
            self.walk(child, Slot::child(parent, depth, i), acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_function() -> Value {
        // function add(a,b) { return a+b; }
        json!({
            "type": "Program",
            "sourceType": "module",
            "body": [{
                "type": "FunctionDeclaration",
                "id": { "type": "Identifier", "name": "add" },
                "params": [
                    { "type": "Identifier", "name": "a" },
                    { "type": "Identifier", "name": "b" }
                ],
                "body": {
                    "type": "BlockStatement",
                    "directives": [],
                    "body": [{
                        "type": "ReturnStatement",
                        "argument": {
                            "type": "BinaryExpression",
                            "operator": "+",
                            "left": { "type": "Identifier", "name": "a" },
                            "right": { "type": "Identifier", "name": "b" }
                        }
                    }]
                },
                "generator": false,
                "async": false
            }],
            "directives": []
        })
    }

    #[test]
    fn full_walk_labels_identifiers() {
        let keys = VisitorKeys::babel();
        let graph = JsFullAdapter::new(&keys).to_graph(&add_function());
        insta::assert_debug_snapshot!(graph.labels(), @r###"
        [
            "Program",
            "FunctionDeclaration",
            "Identifier: add",
            "Identifier: a",
            "Identifier: b",
            "BlockStatement",
            "ReturnStatement",
            "BinaryExpression",
            "Identifier: a",
            "Identifier: b",
        ]
        "###);
        assert_eq!(graph.edge_count(), graph.node_count() - 1);
        assert_eq!(graph.nodes[0].kind, NodeRole::Input);
        assert_eq!(graph.nodes[1].kind, NodeRole::Default);
    }

    #[test]
    fn full_walk_sibling_index_spans_keys() {
        let keys = VisitorKeys::babel();
        let graph = JsFullAdapter::new(&keys).to_graph(&add_function());
        // id, a, b, body under the FunctionDeclaration
        let indices: Vec<usize> = graph.nodes[2..6].iter().map(|n| n.layout_hint.sibling_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(graph.nodes[2..6].iter().all(|n| n.layout_hint.depth == 2));
    }

    #[test]
    fn literal_labels_carry_values() {
        let keys = VisitorKeys::babel();
        let program = json!({
            "type": "Program",
            "body": [{
                "type": "ExpressionStatement",
                "expression": {
                    "type": "ArrayExpression",
                    "elements": [
                        { "type": "NumericLiteral", "value": 42 },
                        null,
                        { "type": "StringLiteral", "value": "hi" }
                    ]
                }
            }]
        });
        let graph = JsFullAdapter::new(&keys).to_graph(&program);
        assert_eq!(
            graph.labels(),
            vec!["Program", "ExpressionStatement", "ArrayExpression", "NumericLiteral: 42", "StringLiteral: hi"]
        );
    }

    #[test]
    fn unknown_type_is_a_leaf() {
        let keys = VisitorKeys::babel();
        let program = json!({
            "type": "Program",
            "body": [{ "type": "PipelineTopicExpression", "expression": { "type": "Identifier", "name": "x" } }]
        });
        let graph = JsFullAdapter::new(&keys).to_graph(&program);
        assert_eq!(graph.labels(), vec!["Program", "PipelineTopicExpression"]);
    }

    #[test]
    fn conceptual_function_has_no_children() {
        let keys = VisitorKeys::babel();
        let graph = JsConceptualAdapter::new(&keys).to_graph(&add_function());
        assert_eq!(graph.labels(), vec!["[Function: add]"]);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes[0].kind, NodeRole::Output);
        assert_eq!(graph.nodes[0].id, "simple-js-0");
    }

    #[test]
    fn conceptual_declarations_flatten_into_parent() {
        // function main() { const a = load(), b = 2; save(a); }
        let program = json!({
            "type": "Program",
            "body": [{
                "type": "FunctionDeclaration",
                "id": { "type": "Identifier", "name": "main" },
                "params": [],
                "body": {
                    "type": "BlockStatement",
                    "body": [
                        {
                            "type": "VariableDeclaration",
                            "kind": "const",
                            "declarations": [
                                {
                                    "type": "VariableDeclarator",
                                    "id": { "type": "Identifier", "name": "a" },
                                    "init": {
                                        "type": "CallExpression",
                                        "callee": { "type": "Identifier", "name": "load" },
                                        "arguments": []
                                    }
                                },
                                {
                                    "type": "VariableDeclarator",
                                    "id": { "type": "Identifier", "name": "b" },
                                    "init": { "type": "NumericLiteral", "value": 2 }
                                }
                            ]
                        },
                        {
                            "type": "ExpressionStatement",
                            "expression": {
                                "type": "CallExpression",
                                "callee": {
                                    "type": "MemberExpression",
                                    "object": { "type": "Identifier", "name": "store" },
                                    "property": { "type": "Identifier", "name": "save" }
                                },
                                "arguments": [{ "type": "Identifier", "name": "a" }]
                            }
                        }
                    ]
                }
            }]
        });
        let keys = VisitorKeys::babel();
        let graph = JsConceptualAdapter::new(&keys).to_graph(&program);
        assert_eq!(
            graph.labels(),
            vec!["[Function: main]", "[Variable: a]", "[Call: load]", "[Variable: b]", "[Call: ...]"]
        );
        assert_eq!(
            graph.label_topology(),
            vec![
                ("[Function: main]", "[Variable: a]"),
                ("[Variable: a]", "[Call: load]"),
                ("[Function: main]", "[Variable: b]"),
                ("[Function: main]", "[Call: ...]"),
            ]
        );
        // Transparent wrappers do not consume depth.
        let depths: Vec<usize> = graph.nodes.iter().map(|n| n.layout_hint.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1, 1]);
        assert!(graph.is_closed());
    }

    #[test]
    fn conceptual_top_level_nodes_have_no_parent() {
        let program = json!({
            "type": "Program",
            "body": [
                { "type": "ClassDeclaration", "id": { "type": "Identifier", "name": "User" }, "body": { "type": "ClassBody", "body": [] } },
                { "type": "ExpressionStatement", "expression": { "type": "CallExpression", "callee": { "type": "Identifier", "name": "boot" }, "arguments": [] } }
            ]
        });
        let keys = VisitorKeys::babel();
        let graph = JsConceptualAdapter::new(&keys).to_graph(&program);
        assert_eq!(graph.labels(), vec!["[Class: User]", "[Call: boot]"]);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes[0].kind, NodeRole::Output);
        assert_eq!(graph.nodes[1].kind, NodeRole::Input);
    }

    #[test]
    fn declarations_follow_the_key_table() {
        // let a = 1, b = 2, c = 3;
        let declarator = |name: &str, value: u32| {
            json!({
                "type": "VariableDeclarator",
                "id": { "type": "Identifier", "name": name },
                "init": { "type": "NumericLiteral", "value": value }
            })
        };
        let program = json!({
            "type": "Program",
            "body": [{
                "type": "VariableDeclaration",
                "kind": "let",
                "declarations": [declarator("a", 1), declarator("b", 2), declarator("c", 3)]
            }]
        });
        let keys = VisitorKeys::from_json(json!({ "Program": ["body"] })).unwrap();
        let full = JsFullAdapter::new(&keys).to_graph(&program);
        let conceptual = JsConceptualAdapter::new(&keys).to_graph(&program);
        assert_eq!(full.labels(), vec!["Program", "VariableDeclaration"]);
        assert!(conceptual.nodes.is_empty());
        assert!(full.nodes.len() >= conceptual.nodes.len());

        let graph = JsConceptualAdapter::new(&VisitorKeys::babel()).to_graph(&program);
        assert_eq!(graph.labels(), vec!["[Variable: a]", "[Variable: b]", "[Variable: c]"]);
        assert!(graph.nodes.iter().all(|n| n.kind == NodeRole::Input));
    }

    #[test]
    fn nested_concepts_take_the_default_role() {
        let keys = VisitorKeys::babel();
        let graph = JsConceptualAdapter::new(&keys).to_graph(&json!({
            "type": "Program",
            "body": [{
                "type": "VariableDeclaration",
                "kind": "const",
                "declarations": [{
                    "type": "VariableDeclarator",
                    "id": { "type": "Identifier", "name": "x" },
                    "init": { "type": "CallExpression", "callee": { "type": "Identifier", "name": "f" }, "arguments": [] }
                }]
            }]
        }));
        assert_eq!(graph.labels(), vec!["[Variable: x]", "[Call: f]"]);
        assert_eq!(graph.nodes[0].kind, NodeRole::Input);
        assert_eq!(graph.nodes[1].kind, NodeRole::Default);
    }
}
