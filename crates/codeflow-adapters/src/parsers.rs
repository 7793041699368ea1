//! Parser contracts
//!
//! Parsing itself happens outside this crate. A parser takes source text and
//! hands back a [`SourceAst`] in its own native shape; the adapters only
//! read the documented parts of that shape.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use codeflow_core::Language;
use serde_json::Value;
use thiserror::Error;

use crate::adapter::SourceAst;
use crate::languages::html::DomNode;
use crate::languages::visitor_keys::VisitorKeys;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The source is not valid for the language. The message is what the
    /// error placeholder shows.
    #[error("{message}")]
    Syntax { message: String },
    #[error("no parser registered for {0}")]
    Unsupported(Language),
    #[error("parser unavailable: {0}")]
    Unavailable(String),
    #[error("parser produced an unreadable tree: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

impl ParseError {
    pub fn syntax(message: impl Into<String>) -> Self {
        ParseError::Syntax {
            message: message.into(),
        }
    }
}

/// A source-to-tree front end for one language.
#[async_trait]
pub trait ExternalParser: Send + Sync {
    fn language(&self) -> Language;

    /// Whether the parser can answer right away. Parsers with a slow
    /// one-time bootstrap report `false` until it is done.
    fn is_ready(&self) -> bool {
        true
    }

    async fn parse(&self, source: &str) -> Result<SourceAst, ParseError>;
}

impl SourceAst {
    /// Wrap a parser's JSON output for `language`.
    ///
    /// JS-family output is either the program/file node itself, or an
    /// object `{ "program": .., "visitorKeys": .. }` carrying the parser's
    /// own key table.
    pub fn from_json(language: Language, value: Value) -> Result<SourceAst, ParseError> {
        let ast = match language {
            Language::JavaScript => match value {
                Value::Object(mut fields) if fields.contains_key("visitorKeys") => {
                    let keys = fields.remove("visitorKeys").unwrap_or_default();
                    SourceAst::JavaScript {
                        program: fields.remove("program").unwrap_or_default(),
                        visitor_keys: Arc::new(VisitorKeys::from_json(keys)?),
                    }
                }
                program => SourceAst::javascript(program),
            },
            Language::Html => SourceAst::Html(serde_json::from_value::<DomNode>(value)?),
            Language::Css => SourceAst::Css(value),
            Language::Java => SourceAst::Java(value),
            Language::Python => SourceAst::Python(value),
            Language::PlainText => return Err(ParseError::Unsupported(language)),
        };
        Ok(ast)
    }
}

/// Parsers available to a session, one per language.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<Language, Arc<dyn ExternalParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `parser`, replacing any earlier one for the same language.
    pub fn register(&mut self, parser: Arc<dyn ExternalParser>) {
        let language = parser.language();
        if self.parsers.insert(language, parser).is_some() {
            tracing::debug!("Replaced parser for {}", language);
        }
    }

    pub fn with(mut self, parser: Arc<dyn ExternalParser>) -> Self {
        self.register(parser);
        self
    }

    pub fn get(&self, language: Language) -> Option<&Arc<dyn ExternalParser>> {
        self.parsers.get(&language)
    }

    pub fn supports(&self, language: Language) -> bool {
        self.parsers.contains_key(&language)
    }

    /// Parse with the parser registered for `language`.
    pub async fn parse(&self, language: Language, source: &str) -> Result<SourceAst, ParseError> {
        let parser = self.get(language).ok_or(ParseError::Unsupported(language))?;
        parser.parse(source).await
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<&str> = self.parsers.keys().map(Language::name).collect();
        languages.sort_unstable();
        f.debug_struct("ParserRegistry").field("languages", &languages).finish()
    }
}
