//! HTML element-tree adapter

use codeflow_core::{Family, GraphAccumulator, NodeRole};
use serde::{Deserialize, Serialize};

use crate::adapter::AstAdapter;
use crate::walk::Slot;

/// A node of a parsed HTML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "lowercase")]
pub enum DomNode {
    Element {
        #[serde(rename = "tagName")]
        tag_name: String,
        #[serde(default)]
        children: Vec<DomNode>,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    Comment {
        #[serde(default)]
        text: String,
    },
}

impl DomNode {
    pub fn element(tag_name: impl Into<String>, children: Vec<DomNode>) -> Self {
        DomNode::Element {
            tag_name: tag_name.into(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        DomNode::Text { text: text.into() }
    }

    /// Element children, in document order.
    pub fn element_children(&self) -> impl Iterator<Item = &DomNode> {
        let children: &[DomNode] = match self {
            DomNode::Element { children, .. } => children,
            _ => &[],
        };
        children.iter().filter(|c| matches!(c, DomNode::Element { .. }))
    }
}

/// One node per element, labeled `<tag>`. The DOM is already minimal, so
/// there is no conceptual variant.
pub struct HtmlAdapter;

impl AstAdapter for HtmlAdapter {
    type Node = DomNode;

    fn family(&self) -> Family {
        Family::Dom
    }

    fn walk(&self, node: &DomNode, slot: Slot<'_>, acc: &mut GraphAccumulator) {
        let DomNode::Element { tag_name, .. } = node else {
            return;
        };
        let label = format!("<{}>", tag_name.to_lowercase());
        let id = acc.attach(slot.parent, label, NodeRole::for_depth(slot.depth), slot.hint());

        for (i, child) in node.element_children().enumerate() {
            self.walk(child, Slot::child(Some(&id), slot.depth + 1, i), acc);
        }
    }
}
