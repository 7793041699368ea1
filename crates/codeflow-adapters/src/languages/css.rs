//! Stylesheet adapter over css-tree shaped ASTs

use codeflow_core::{Family, GraphAccumulator, NodeRole};
use serde_json::Value;
use thiserror::Error;

use crate::adapter::AstAdapter;
use crate::walk::{has_type, node_type, typed_children, Slot};

/// Structural child keys, in the order css-tree's walker visits them.
const CHILD_KEYS: &[&str] = &["prelude", "block", "value", "children"];

/// A sub-tree that cannot be turned back into text. Typical mid-edit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("node has no type")]
    Untyped,
    #[error("{node_type} is missing `{field}`")]
    MissingField { node_type: String, field: &'static str },
    #[error("cannot generate {0}")]
    Unsupported(String),
}

/// One graph node per stylesheet node.
pub struct CssAdapter;

impl CssAdapter {
    /// Label for a node, falling back to its bare type when the
    /// descriptive form cannot be produced.
    pub fn label(node: &Value, ty: &str) -> String {
        let described = match ty {
            "Selector" => generate(node).map(|text| format!("Selector: {}", text)),
            "Declaration" => field(node, ty, "property").map(|p| format!("Declaration: {}: ...", p)),
            _ => return ty.to_string(),
        };
        described.unwrap_or_else(|e| {
            tracing::trace!("css label fallback for {}: {}", ty, e);
            ty.to_string()
        })
    }
}

impl AstAdapter for CssAdapter {
    type Node = Value;

    fn family(&self) -> Family {
        Family::Css
    }

    fn walk(&self, node: &Value, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        // The root is always materialized, even if the parser lost its type.
        let ty = node_type(node).unwrap_or("StyleSheet");
        if slot.depth > 0 && node_type(node).is_none() {
            return;
        }
        let id = acc.attach(slot.parent, Self::label(node, ty), NodeRole::for_depth(slot.depth), slot.hint());

        let children = CHILD_KEYS.iter().flat_map(|k| typed_children(node, k, has_type));
        for (i, child) in children.enumerate() {
            self.walk(child, Slot::child(Some(&id), slot.depth + 1, i), acc);
        }
    }
}

fn field<'v>(node: &'v Value, node_type: &str, field: &'static str) -> Result<&'v str, LabelError> {
    node.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| LabelError::MissingField {
            node_type: node_type.to_string(),
            field,
        })
}

fn generate_all(nodes: &[Value], separator: &str) -> Result<String, LabelError> {
    let parts = nodes.iter().map(generate).collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(separator))
}

fn list<'v>(node: &'v Value, node_type: &str) -> Result<&'v [Value], LabelError> {
    node.get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| LabelError::MissingField {
            node_type: node_type.to_string(),
            field: "children",
        })
}

/// `a` and `b` arrive as signed strings; numbers are tolerated.
fn coefficient(node: &Value, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn an_plus_b(node: &Value) -> String {
    let b = coefficient(node, "b");
    let Some(a) = coefficient(node, "a") else {
        return b.unwrap_or_default();
    };
    let mut text = match a.as_str() {
        "1" | "+1" => "n".to_string(),
        "-1" => "-n".to_string(),
        _ => format!("{}n", a),
    };
    if let Some(b) = b {
        if !b.starts_with(['+', '-']) {
            text.push('+');
        }
        text.push_str(&b);
    }
    text
}

/// Regenerate selector text from a selector sub-tree.
pub fn generate(node: &Value) -> Result<String, LabelError> {
    let ty = node_type(node).ok_or(LabelError::Untyped)?;
    let text = match ty {
        "SelectorList" => generate_all(list(node, ty)?, ",")?,
        "Selector" => generate_all(list(node, ty)?, "")?,
        "TypeSelector" | "Identifier" | "Combinator" => field(node, ty, "name")?.to_string(),
        "ClassSelector" => format!(".{}", field(node, ty, "name")?),
        "IdSelector" => format!("#{}", field(node, ty, "name")?),
        "NestingSelector" => "&".to_string(),
        "PseudoElementSelector" => format!("::{}", field(node, ty, "name")?),
        "PseudoClassSelector" => {
            let name = field(node, ty, "name")?;
            match node.get("children").and_then(Value::as_array) {
                Some(args) => format!(":{}({})", name, generate_all(args, "")?),
                None => format!(":{}", name),
            }
        }
        "AttributeSelector" => {
            let name = node.get("name").ok_or_else(|| LabelError::MissingField {
                node_type: ty.to_string(),
                field: "name",
            })?;
            let mut text = format!("[{}", generate(name)?);
            if let Some(matcher) = node.get("matcher").and_then(Value::as_str) {
                text.push_str(matcher);
                if let Some(value) = node.get("value").filter(|v| !v.is_null()) {
                    text.push_str(&generate(value)?);
                }
            }
            if let Some(flags) = node.get("flags").and_then(Value::as_str) {
                text.push(' ');
                text.push_str(flags);
            }
            text.push(']');
            text
        }
        "Nth" => {
            let nth = node.get("nth").ok_or_else(|| LabelError::MissingField {
                node_type: ty.to_string(),
                field: "nth",
            })?;
            let mut text = generate(nth)?;
            if let Some(selector) = node.get("selector").filter(|s| !s.is_null()) {
                text.push_str(" of ");
                text.push_str(&generate(selector)?);
            }
            text
        }
        "AnPlusB" => an_plus_b(node),
        "String" => format!("\"{}\"", field(node, ty, "value")?),
        "Raw" => field(node, ty, "value")?.to_string(),
        other => return Err(LabelError::Unsupported(other.to_string())),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule() -> Value {
        // a.btn > #main { color: red }
        json!({
            "type": "StyleSheet",
            "children": [{
                "type": "Rule",
                "prelude": {
                    "type": "SelectorList",
                    "children": [{
                        "type": "Selector",
                        "children": [
                            { "type": "TypeSelector", "name": "a" },
                            { "type": "ClassSelector", "name": "btn" },
                            { "type": "Combinator", "name": ">" },
                            { "type": "IdSelector", "name": "main" }
                        ]
                    }]
                },
                "block": {
                    "type": "Block",
                    "children": [{
                        "type": "Declaration",
                        "important": false,
                        "property": "color",
                        "value": { "type": "Value", "children": [{ "type": "Identifier", "name": "red" }] }
                    }]
                }
            }]
        })
    }

    #[test]
    fn walks_prelude_then_block() {
        let graph = CssAdapter.to_graph(&rule());
        insta::assert_debug_snapshot!(graph.labels(), @r###"
        [
            "StyleSheet",
            "Rule",
            "SelectorList",
            "Selector: a.btn>#main",
            "TypeSelector",
            "ClassSelector",
            "Combinator",
            "IdSelector",
            "Block",
            "Declaration: color: ...",
            "Value",
            "Identifier",
        ]
        "###);
        assert!(graph.is_closed());
        assert_eq!(graph.nodes[0].id, "css-0");
    }

    #[test]
    fn malformed_fragment_falls_back() {
        // What a tolerant parser returns for `a { color: `
        let sheet = json!({
            "type": "StyleSheet",
            "children": [{
                "type": "Rule",
                "prelude": {
                    "type": "SelectorList",
                    "children": [{ "type": "Selector", "children": [{ "type": "TypeSelector" }] }]
                },
                "block": {
                    "type": "Block",
                    "children": [{ "type": "Declaration", "value": { "type": "Raw", "value": "" } }]
                }
            }]
        });
        let graph = CssAdapter.to_graph(&sheet);
        assert_eq!(graph.labels()[0], "StyleSheet");
        assert!(graph.labels().contains(&"Selector"));
        assert!(graph.labels().contains(&"Declaration"));
    }

    #[test]
    fn untyped_root_still_yields_stylesheet() {
        let graph = CssAdapter.to_graph(&json!({ "children": null }));
        assert_eq!(graph.labels(), vec!["StyleSheet"]);
    }

    #[test]
    fn generates_pseudo_and_attribute_selectors() {
        let selector = json!({
            "type": "Selector",
            "children": [
                { "type": "TypeSelector", "name": "input" },
                {
                    "type": "AttributeSelector",
                    "name": { "type": "Identifier", "name": "type" },
                    "matcher": "=",
                    "value": { "type": "String", "value": "text" },
                    "flags": null
                },
                { "type": "PseudoClassSelector", "name": "hover", "children": null },
                { "type": "Combinator", "name": " " },
                { "type": "PseudoElementSelector", "name": "before" }
            ]
        });
        assert_eq!(generate(&selector).unwrap(), "input[type=\"text\"]:hover ::before");
    }

    #[test]
    fn unsupported_part_is_an_error() {
        let selector = json!({ "type": "Selector", "children": [{ "type": "Percentage", "value": "50" }] });
        assert_eq!(generate(&selector), Err(LabelError::Unsupported("Percentage".into())));
        assert_eq!(CssAdapter::label(&selector, "Selector"), "Selector");
    }

    #[test]
    fn structural_pseudo_classes_keep_their_arguments() {
        let nth = |nth: Value| {
            json!({
                "type": "PseudoClassSelector",
                "name": "nth-child",
                "children": [{ "type": "Nth", "nth": nth, "selector": null }]
            })
        };
        let selector = json!({
            "type": "Selector",
            "children": [{ "type": "TypeSelector", "name": "li" }, nth(json!({ "type": "AnPlusB", "a": null, "b": "2" }))]
        });
        assert_eq!(CssAdapter::label(&selector, "Selector"), "Selector: li:nth-child(2)");

        let odd = json!({ "type": "Identifier", "name": "odd" });
        assert_eq!(generate(&nth(odd)).unwrap(), ":nth-child(odd)");
        let cases = [
            (json!({ "a": "2", "b": "1" }), ":nth-child(2n+1)"),
            (json!({ "a": "-1", "b": "3" }), ":nth-child(-n+3)"),
            (json!({ "a": "3", "b": "-2" }), ":nth-child(3n-2)"),
            (json!({ "a": "1", "b": null }), ":nth-child(n)"),
        ];
        for (mut coefficients, expected) in cases {
            coefficients["type"] = json!("AnPlusB");
            assert_eq!(generate(&nth(coefficients)).unwrap(), expected);
        }

        let of_class = json!({
            "type": "PseudoClassSelector",
            "name": "nth-of-type",
            "children": [{
                "type": "Nth",
                "nth": { "type": "Identifier", "name": "even" },
                "selector": {
                    "type": "SelectorList",
                    "children": [{ "type": "Selector", "children": [{ "type": "ClassSelector", "name": "item" }] }]
                }
            }]
        });
        assert_eq!(generate(&of_class).unwrap(), ":nth-of-type(even of .item)");
    }
}
