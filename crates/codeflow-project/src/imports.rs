//! Import-declaration scanners for JS-family files

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use codeflow_adapters::{ExternalParser, ParseError, SourceAst};
use serde_json::Value;
use thiserror::Error;
use tree_sitter::{Language, Parser};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error("grammar unavailable for {path}: {message}")]
    Grammar { path: String, message: String },
    #[error("{path} did not produce a JS-family tree")]
    NotJavaScript { path: String },
}

/// Extracts the module specifiers of a file's import declarations, in
/// source order.
#[async_trait]
pub trait ImportScanner: Send + Sync {
    async fn scan(&self, path: &str, source: &str) -> Result<Vec<String>, ScanError>;
}

/// Whether `path` is a module the dependency builder scans.
pub fn is_script_path(path: &str) -> bool {
    matches!(
        Path::new(path).extension().and_then(|e| e.to_str()),
        Some("js" | "jsx" | "ts" | "tsx")
    )
}

/// Scanner over tree-sitter's JavaScript and TypeScript grammars. Error
/// tolerant: imports outside broken regions are still reported.
#[derive(Debug, Default)]
pub struct TreeSitterImportScanner;

impl TreeSitterImportScanner {
    pub fn new() -> Self {
        TreeSitterImportScanner
    }

    fn grammar(path: &str) -> Language {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("ts") => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Some("tsx") => tree_sitter_typescript::LANGUAGE_TSX.into(),
            _ => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    /// Synchronous form of [`ImportScanner::scan`].
    pub fn scan_source(&self, path: &str, source: &str) -> Result<Vec<String>, ScanError> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::grammar(path))
            .map_err(|e| ScanError::Grammar {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        let tree = parser.parse(source, None).ok_or_else(|| ScanError::Grammar {
            path: path.to_string(),
            message: "parser returned no tree".to_string(),
        })?;

        let bytes = source.as_bytes();
        let root = tree.root_node();
        let mut cursor = root.walk();
        let specifiers = root
            .named_children(&mut cursor)
            .filter(|node| node.kind() == "import_statement")
            .filter_map(|node| node.child_by_field_name("source"))
            .filter_map(|literal| literal.utf8_text(bytes).ok())
            .map(|text| text.trim_matches(|c| c == '"' || c == '\'').to_string())
            .collect();
        Ok(specifiers)
    }
}

#[async_trait]
impl ImportScanner for TreeSitterImportScanner {
    async fn scan(&self, path: &str, source: &str) -> Result<Vec<String>, ScanError> {
        self.scan_source(path, source)
    }
}

/// Scanner that asks a host JS parser for its ESTree/Babel program and
/// reads `ImportDeclaration.source.value` from the top-level body.
pub struct EstreeImportScanner {
    parser: Arc<dyn ExternalParser>,
}

impl EstreeImportScanner {
    pub fn new(parser: Arc<dyn ExternalParser>) -> Self {
        EstreeImportScanner { parser }
    }
}

/// Import specifiers of a Babel `File` or ESTree/Babel `Program` node.
pub fn program_imports(program: &Value) -> Vec<String> {
    let program = program.get("program").unwrap_or(program);
    program
        .get("body")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|stmt| stmt.get("type").and_then(Value::as_str) == Some("ImportDeclaration"))
        .filter_map(|stmt| stmt.get("source")?.get("value")?.as_str())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl ImportScanner for EstreeImportScanner {
    async fn scan(&self, path: &str, source: &str) -> Result<Vec<String>, ScanError> {
        let ast = self.parser.parse(source).await.map_err(|source| ScanError::Parse {
            path: path.to_string(),
            source,
        })?;
        match ast {
            SourceAst::JavaScript { program, .. } => Ok(program_imports(&program)),
            _ => Err(ScanError::NotJavaScript { path: path.to_string() }),
        }
    }
}
