//! Source-tree adapters: parser output in, uniform structure graph out

pub mod adapter;
pub mod command;
pub mod html_parser;
pub mod languages;
pub mod parsers;
pub mod walk;


pub use adapter::{AstAdapter, SourceAst};
pub use command::CommandParser;
pub use html_parser::TreeSitterHtmlParser;
pub use languages::css::{CssAdapter, LabelError};
pub use languages::html::{DomNode, HtmlAdapter};
pub use languages::java::{JavaConceptualAdapter, JavaFullAdapter};
pub use languages::javascript::{JsConceptualAdapter, JsFullAdapter};
pub use languages::python::{PythonConceptualAdapter, PythonFullAdapter};
pub use languages::visitor_keys::VisitorKeys;
pub use parsers::{ExternalParser, ParseError, ParserRegistry};
pub use walk::Slot;
