//! Built-in HTML front end using tree-sitter-html

use async_trait::async_trait;
use codeflow_core::Language;
use tree_sitter::{Node, Parser};

use crate::adapter::SourceAst;
use crate::languages::html::DomNode;
use crate::parsers::{ExternalParser, ParseError};

/// Tag used when a document has several top-level nodes.
const SYNTHETIC_ROOT: &str = "html";

/// Builds a [`DomNode`] tree from HTML source. Tolerant like a browser:
/// malformed markup still yields a tree.
#[derive(Debug, Default)]
pub struct TreeSitterHtmlParser;

impl TreeSitterHtmlParser {
    pub fn new() -> Self {
        TreeSitterHtmlParser
    }

    /// Parse synchronously.
    pub fn parse_document(&self, source: &str) -> Result<DomNode, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .map_err(|e| ParseError::Unavailable(format!("tree-sitter-html: {}", e)))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Unavailable("tree-sitter-html returned no tree".to_string()))?;

        let mut top = convert_children(tree.root_node(), source.as_bytes(), true);

        let elements = top.iter().filter(|n| matches!(n, DomNode::Element { .. })).count();
        if elements == 1 {
            if let Some(pos) = top.iter().position(|n| matches!(n, DomNode::Element { .. })) {
                return Ok(top.swap_remove(pos));
            }
        }
        Ok(DomNode::element(SYNTHETIC_ROOT, top))
    }
}

fn text_of(node: Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(str::to_string)
}

/// Tag name of a `start_tag`, `end_tag` or `self_closing_tag`.
fn tag_of(tag: Node, source: &[u8]) -> Option<String> {
    let mut cursor = tag.walk();
    let name = tag.named_children(&mut cursor).find(|c| c.kind() == "tag_name")?;
    text_of(name, source)
}

fn tag_name(node: Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let tag = node
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "start_tag" | "self_closing_tag"))?;
    tag_of(tag, source)
}

/// Elements opened by bare tags inside an error region, innermost last.
#[derive(Default)]
struct OpenTags {
    open: Vec<(String, Vec<DomNode>)>,
    done: Vec<DomNode>,
}

impl OpenTags {
    fn push(&mut self, node: DomNode) {
        match self.open.last_mut() {
            Some((_, children)) => children.push(node),
            None => self.done.push(node),
        }
    }

    fn close_one(&mut self) {
        if let Some((tag_name, children)) = self.open.pop() {
            self.push(DomNode::Element { tag_name, children });
        }
    }

    /// Close everything up to and including the innermost `tag`. An end
    /// tag nothing opened is ignored.
    fn close(&mut self, tag: &str) {
        let Some(pos) = self.open.iter().rposition(|(name, _)| name.eq_ignore_ascii_case(tag)) else {
            return;
        };
        while self.open.len() > pos {
            self.close_one();
        }
    }

    fn finish(mut self) -> Vec<DomNode> {
        while !self.open.is_empty() {
            self.close_one();
        }
        self.done
    }
}

/// Converted named children of `node`. Error regions are spliced into the
/// parent. With `recover`, a start tag left without its element opens one
/// that takes the following siblings; otherwise tags belong to `node` itself
/// and are skipped.
fn convert_children(node: Node, source: &[u8], recover: bool) -> Vec<DomNode> {
    let mut tags = OpenTags::default();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let is_tag = matches!(
            child.kind(),
            "start_tag" | "tag_name" | "self_closing_tag" | "end_tag" | "erroneous_end_tag"
        );
        if is_tag && !recover {
            continue;
        }
        match child.kind() {
            "start_tag" => {
                if let Some(tag) = tag_of(child, source) {
                    tags.open.push((tag, Vec::new()));
                }
            }
            "tag_name" => {
                if let Some(tag) = text_of(child, source) {
                    tags.open.push((tag, Vec::new()));
                }
            }
            "self_closing_tag" => {
                if let Some(tag) = tag_of(child, source) {
                    tags.push(DomNode::element(tag, Vec::new()));
                }
            }
            "end_tag" | "erroneous_end_tag" => {
                let mut inner = child.walk();
                let name = child
                    .named_children(&mut inner)
                    .find(|c| matches!(c.kind(), "tag_name" | "erroneous_end_tag_name"))
                    .and_then(|c| text_of(c, source));
                if let Some(name) = name {
                    tags.close(&name);
                }
            }
            _ => {
                for converted in convert(child, source) {
                    tags.push(converted);
                }
            }
        }
    }
    tags.finish()
}

fn convert(node: Node, source: &[u8]) -> Vec<DomNode> {
    match node.kind() {
        "element" | "script_element" | "style_element" => match tag_name(node, source) {
            Some(tag_name) => vec![DomNode::Element {
                tag_name,
                children: convert_children(node, source, false),
            }],
            None => convert_children(node, source, true),
        },
        "ERROR" => convert_children(node, source, true),
        "text" | "raw_text" => text_of(node, source).map(DomNode::text).into_iter().collect(),
        "comment" => text_of(node, source)
            .map(|text| DomNode::Comment { text })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl ExternalParser for TreeSitterHtmlParser {
    fn language(&self) -> Language {
        Language::Html
    }

    async fn parse(&self, source: &str) -> Result<SourceAst, ParseError> {
        self.parse_document(source).map(SourceAst::Html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AstAdapter;
    use crate::languages::html::HtmlAdapter;

    #[test]
    fn single_root_element() {
        let dom = TreeSitterHtmlParser::new()
            .parse_document("<div><p>Hello</p><!-- note --><br/></div>")
            .unwrap();
        let graph = HtmlAdapter.to_graph(&dom);
        assert_eq!(graph.labels(), vec!["<div>", "<p>", "<br>"]);
    }

    #[test]
    fn several_roots_are_wrapped() {
        let dom = TreeSitterHtmlParser::new()
            .parse_document("<!DOCTYPE html><HEAD></HEAD><body><script>let x = 1;</script></body>")
            .unwrap();
        let graph = HtmlAdapter.to_graph(&dom);
        assert_eq!(graph.labels(), vec!["<html>", "<head>", "<body>", "<script>"]);
    }

    #[test]
    fn unclosed_markup_still_parses() {
        for source in ["<ul><li>one<li>two", "<ul><li>one</li><li>two", "<ul><li>"] {
            let dom = TreeSitterHtmlParser::new().parse_document(source).unwrap();
            let graph = HtmlAdapter.to_graph(&dom);
            assert_eq!(graph.labels()[0], "<ul>", "source {:?}", source);
            assert!(graph.labels().contains(&"<li>"), "source {:?}", source);
            assert!(graph.is_closed());
        }
    }

    #[test]
    fn bare_tags_in_error_regions() {
        let mut tags = OpenTags::default();
        tags.open.push(("ul".to_string(), Vec::new()));
        tags.open.push(("li".to_string(), Vec::new()));
        tags.push(DomNode::text("one"));
        tags.close("LI");
        tags.close("table");
        tags.push(DomNode::element("li", Vec::new()));
        let nodes = tags.finish();

        assert_eq!(nodes.len(), 1);
        let graph = HtmlAdapter.to_graph(&nodes[0]);
        assert_eq!(graph.labels(), vec!["<ul>", "<li>", "<li>"]);
        assert_eq!(graph.label_topology(), vec![("<ul>", "<li>"), ("<ul>", "<li>")]);
    }
}
