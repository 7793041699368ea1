//! Adapter trait and the variant source tree it dispatches over

use std::sync::Arc;

use codeflow_core::{Family, FidelityMode, Graph, GraphAccumulator, Language};
use serde_json::Value;

use crate::languages::css::CssAdapter;
use crate::languages::html::{DomNode, HtmlAdapter};
use crate::languages::java::{JavaConceptualAdapter, JavaFullAdapter};
use crate::languages::javascript::{JsConceptualAdapter, JsFullAdapter};
use crate::languages::python::{PythonConceptualAdapter, PythonFullAdapter};
use crate::languages::visitor_keys::VisitorKeys;
use crate::walk::Slot;

/// One normalization strategy for one tree shape.
pub trait AstAdapter {
    /// Native node type this adapter reads.
    type Node: ?Sized;

    /// Id prefix and spacing of the nodes this adapter emits.
    fn family(&self) -> Family;

    /// Visit `node` at `slot`, appending whatever it materializes.
    fn walk(&self, node: &Self::Node, slot: Slot<'_>, acc: &mut GraphAccumulator);

    /// Walk a whole tree into a fresh graph.
    fn to_graph(&self, root: &Self::Node) -> Graph {
        let mut acc = GraphAccumulator::new(self.family());
        self.walk(root, Slot::root(), &mut acc);
        acc.finish()
    }
}

/// Output of one of the external parsers, in that parser's own shape.
#[derive(Debug, Clone)]
pub enum SourceAst {
    /// Babel-style program node plus the parser's visitor-key table.
    JavaScript {
        program: Value,
        visitor_keys: Arc<VisitorKeys>,
    },
    /// Root element of a parsed HTML document.
    Html(DomNode),
    /// css-tree style stylesheet node.
    Css(Value),
    /// java-parser style CST root (`compilationUnit`).
    Java(Value),
    /// `_type`-tagged Python AST as JSON.
    Python(Value),
}

impl SourceAst {
    /// JS-family tree using the built-in Babel visitor-key table.
    pub fn javascript(program: Value) -> Self {
        SourceAst::JavaScript {
            program,
            visitor_keys: Arc::new(VisitorKeys::babel()),
        }
    }

    pub fn language(&self) -> Language {
        match self {
            SourceAst::JavaScript { .. } => Language::JavaScript,
            SourceAst::Html(_) => Language::Html,
            SourceAst::Css(_) => Language::Css,
            SourceAst::Java(_) => Language::Java,
            SourceAst::Python(_) => Language::Python,
        }
    }

    /// Normalize this tree under `mode`. Families without a conceptual
    /// variant (HTML, CSS) walk structurally in both modes.
    pub fn to_graph(&self, mode: FidelityMode) -> Graph {
        tracing::debug!(language = %self.language(), ?mode, "normalizing tree");
        match (self, mode) {
            (SourceAst::JavaScript { program, visitor_keys }, FidelityMode::Advanced) => {
                JsFullAdapter::new(visitor_keys).to_graph(program)
            }
            (SourceAst::JavaScript { program, visitor_keys }, FidelityMode::Simple) => {
                JsConceptualAdapter::new(visitor_keys).to_graph(program)
            }
            (SourceAst::Html(root), _) => HtmlAdapter.to_graph(root),
            (SourceAst::Css(root), _) => CssAdapter.to_graph(root),
            (SourceAst::Java(root), FidelityMode::Advanced) => JavaFullAdapter.to_graph(root),
            (SourceAst::Java(root), FidelityMode::Simple) => JavaConceptualAdapter.to_graph(root),
            (SourceAst::Python(root), FidelityMode::Advanced) => PythonFullAdapter.to_graph(root),
            (SourceAst::Python(root), FidelityMode::Simple) => PythonConceptualAdapter.to_graph(root),
        }
    }
}
