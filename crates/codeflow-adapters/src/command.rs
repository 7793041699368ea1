//! Parser backed by an external program
//!
//! The program receives the source on stdin and prints the tree as JSON on
//! stdout. A non-zero exit is a syntax error whose message is the first
//! line of stderr.

use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use codeflow_core::{CodeflowConfig, Language};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::adapter::SourceAst;
use crate::parsers::{ExternalParser, ParseError, ParserRegistry};

pub struct CommandParser {
    language: Language,
    program: String,
    args: Vec<String>,
    /// Set once a run has completed; until then a slow-start parser
    /// reports itself as not ready.
    warmed: AtomicBool,
    slow_start: bool,
}

impl CommandParser {
    /// `argv[0]` is the program, the rest its arguments. `None` for an
    /// empty command line.
    pub fn new(language: Language, argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(CommandParser {
            language,
            program: program.clone(),
            args: args.to_vec(),
            warmed: AtomicBool::new(false),
            slow_start: false,
        })
    }

    /// Mark the program as having a slow first run (an interpreter that
    /// boots a runtime, for instance).
    pub fn slow_start(mut self, slow: bool) -> Self {
        self.slow_start = slow;
        self
    }

    async fn run(&self, source: &str) -> Result<Vec<u8>, ParseError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ParseError::Unavailable(format!("{}: {}", self.program, e)))?;

        // Feed stdin while draining stdout so large trees cannot stall the pipe.
        let input = source.as_bytes().to_vec();
        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|e| ParseError::Unavailable(format!("{}: {}", self.program, e)))?;
        if let Err(e) = written {
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(ParseError::Unavailable(format!("{}: {}", self.program, e)));
            }
        }
        self.warmed.store(true, Ordering::Release);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("parse failed")
                .trim()
                .to_string();
            return Err(ParseError::syntax(message));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl ExternalParser for CommandParser {
    fn language(&self) -> Language {
        self.language
    }

    fn is_ready(&self) -> bool {
        !self.slow_start || self.warmed.load(Ordering::Acquire)
    }

    async fn parse(&self, source: &str) -> Result<SourceAst, ParseError> {
        tracing::debug!("Running {} parser: {}", self.language, self.program);
        let stdout = self.run(source).await?;
        let value = serde_json::from_slice(&stdout)?;
        SourceAst::from_json(self.language, value)
    }
}

impl ParserRegistry {
    /// Built-in front ends plus every parser command in `config`. The
    /// Python command is treated as slow to start.
    pub fn from_config(config: &CodeflowConfig) -> Self {
        let mut registry = ParserRegistry::new().with(Arc::new(crate::html_parser::TreeSitterHtmlParser::new()));
        for (name, argv) in &config.parsers {
            let Ok(language) = name.parse::<Language>() else {
                tracing::warn!("Ignoring parser for unknown language {:?}", name);
                continue;
            };
            if let Some(parser) = CommandParser::new(language, argv) {
                let parser = parser.slow_start(language == Language::Python);
                registry.register(Arc::new(parser));
            }
        }
        registry
    }
}
