//! Core data structures for the structure graph

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rendering role hint for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Root of a walk (depth 0).
    Input,
    /// Intermediate node.
    #[default]
    Default,
    /// Emphasized leaf or feature node.
    Output,
}

impl NodeRole {
    /// The structural default: roots are inputs, everything else is plain.
    pub fn for_depth(depth: usize) -> Self {
        if depth == 0 {
            NodeRole::Input
        } else {
            NodeRole::Default
        }
    }
}

/// Deterministic layout bookkeeping recorded during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LayoutHint {
    pub depth: usize,
    pub sibling_index: usize,
}

/// Pixel position derived from a [`LayoutHint`] and a family's spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Horizontal/vertical spacing used to turn layout hints into positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Spacing {
    pub const fn new(horizontal: f32, vertical: f32) -> Self {
        Spacing { horizontal, vertical }
    }

    pub fn position(&self, hint: LayoutHint) -> Position {
        Position {
            x: hint.sibling_index as f32 * self.horizontal,
            y: hint.depth as f32 * self.vertical,
        }
    }
}

/// The walker family a node was produced by. Drives id prefixes and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Dom,
    Js,
    SimpleJs,
    Css,
    Java,
    SimpleJava,
    Python,
    SimplePython,
}

impl Family {
    /// Prefix used for node ids: `<prefix>-<count>`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Family::Dom => "dom",
            Family::Js => "js",
            Family::SimpleJs => "simple-js",
            Family::Css => "css",
            Family::Java => "java",
            Family::SimpleJava => "simple-java",
            Family::Python => "py",
            Family::SimplePython => "simple-py",
        }
    }

    pub fn spacing(&self) -> Spacing {
        match self {
            Family::Dom => Spacing::new(170.0, 100.0),
            Family::Js | Family::Java | Family::Python => Spacing::new(220.0, 100.0),
            Family::Css => Spacing::new(200.0, 100.0),
            Family::SimpleJs | Family::SimplePython => Spacing::new(250.0, 100.0),
            Family::SimpleJava => Spacing::new(300.0, 120.0),
        }
    }
}

/// A single node in the structure graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeRole,
    pub layout_hint: LayoutHint,
    pub position: Position,
    /// Synthetic node standing in for something outside the project.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

/// A directed edge between two nodes of the same graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Rendered animated/highlighted.
    #[serde(default)]
    pub emphasized: bool,
}

impl GraphEdge {
    /// Plain parent → child edge with the conventional id.
    pub fn between(source: &str, target: &str) -> Self {
        GraphEdge {
            id: edge_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
            label: None,
            emphasized: false,
        }
    }
}

/// Conventional edge id: `e-<source>-to-<target>`.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("e-{}-to-{}", source, target)
}

/// Source languages the adapters understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Html,
    Css,
    Java,
    Python,
    /// Nothing could parse the buffer.
    PlainText,
}

impl Language {
    /// Language tag for an open project file. Anything that is not
    /// stylesheet or markup is treated as JS-family.
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("css") => Language::Css,
            Some("html") | Some("htm") => Language::Html,
            Some("java") => Language::Java,
            Some("py") | Some("pyi") => Language::Python,
            _ => Language::JavaScript,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Html => "html",
            Language::Css => "css",
            Language::Java => "java",
            Language::Python => "python",
            Language::PlainText => "plaintext",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "typescript" | "ts" | "tsx" => Ok(Language::JavaScript),
            "html" | "htm" => Ok(Language::Html),
            "css" => Ok(Language::Css),
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            "plaintext" | "text" => Ok(Language::PlainText),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// Fidelity policy for a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FidelityMode {
    /// Conceptual: functions, classes, variables, calls.
    #[default]
    Simple,
    /// Full: one graph node per source tree node.
    Advanced,
}

impl FromStr for FidelityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" | "conceptual" => Ok(FidelityMode::Simple),
            "advanced" | "full" => Ok(FidelityMode::Advanced),
            other => Err(format!("unknown fidelity mode: {}", other)),
        }
    }
}

/// A file of an opened project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Slash-separated, relative to the project root.
    pub path: String,
    pub content: String,
}

impl ProjectFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        ProjectFile {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        basename(&self.path)
    }
}

/// Last segment of a slash-separated path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Outcome of resolving one import specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedImport {
    pub from_path: String,
    /// Resolved project path, the verbatim specifier for externals, or
    /// `None` when a relative specifier matched no known file.
    pub to_path: Option<String>,
    pub is_external: bool,
}
