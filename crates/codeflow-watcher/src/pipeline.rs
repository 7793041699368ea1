//! Debounced, superseding recomputation of the displayed graph
//!
//! Edits are applied to a [`Session`] as they arrive. Once a burst settles
//! the pipeline takes a snapshot, allocates a [`Token`] and computes the
//! graph in its own task. Only a result whose token is still the latest
//! reaches subscribers; anything older is dropped.

use std::sync::Arc;

use codeflow_adapters::{ParseError, ParserRegistry, SourceAst};
use codeflow_core::{FidelityMode, Graph, Language};
use codeflow_project::DependencyGraphBuilder;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::debounce::Debouncer;
use crate::session::{Edit, Session, ViewMode};
use crate::token::{Token, TokenIssuer};

/// One delivered graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphUpdate {
    /// Token sequence of the recomputation that produced it, 0 before the
    /// first delivery.
    pub sequence: u64,
    pub view: ViewMode,
    /// Language the graph was built from. `plaintext` when nothing could
    /// parse the buffer.
    pub language: Language,
    pub mode: FidelityMode,
    pub graph: Graph,
}

impl Default for GraphUpdate {
    fn default() -> Self {
        GraphUpdate {
            sequence: 0,
            view: ViewMode::Scratch,
            language: Language::JavaScript,
            mode: FidelityMode::default(),
            graph: Graph::new(),
        }
    }
}

/// Placeholder text while the parser for `language` boots.
fn loading_subject(language: Language) -> String {
    match language {
        Language::Python => "Python runtime".to_string(),
        other => format!("{} parser", other),
    }
}

/// Markup is assumed when the trimmed buffer looks like a single tag run.
fn looks_like_markup(trimmed: &str) -> bool {
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

pub struct RecomputePipeline {
    registry: ParserRegistry,
    builder: DependencyGraphBuilder,
    tokens: TokenIssuer,
    updates: watch::Sender<GraphUpdate>,
}

impl RecomputePipeline {
    pub fn new(registry: ParserRegistry, builder: DependencyGraphBuilder) -> Self {
        let (updates, _) = watch::channel(GraphUpdate::default());
        RecomputePipeline {
            registry,
            builder,
            tokens: TokenIssuer::new(),
            updates,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GraphUpdate> {
        self.updates.subscribe()
    }

    /// Most recently delivered update.
    pub fn latest(&self) -> GraphUpdate {
        self.updates.borrow().clone()
    }

    /// Recompute for `session` right away, under a fresh token.
    pub async fn recompute(&self, session: &Session) -> bool {
        let token = self.tokens.issue();
        self.fire(token, session).await
    }

    /// Compute the graph for `session` and deliver it if `token` is still
    /// the latest. Returns whether the final graph was delivered.
    pub async fn fire(&self, token: Token, session: &Session) -> bool {
        let mode = session.mode;
        match &session.project {
            Some(project) => {
                let report = self.builder.build(&project.files).await;
                if !report.skipped.is_empty() {
                    debug!("{} files skipped in dependency pass", report.skipped.len());
                }
                let language = session.active_language().unwrap_or(Language::JavaScript);
                self.deliver(token, ViewMode::Project, language, mode, report.graph)
            }
            None => {
                let (language, graph) = self.scratch_graph(token, session).await;
                self.deliver(token, ViewMode::Scratch, language, mode, graph)
            }
        }
    }

    /// Graph of the scratch buffer. Explicit tags are honored; otherwise
    /// markup goes to HTML and anything else is tried as JS, then CSS.
    async fn scratch_graph(&self, token: Token, session: &Session) -> (Language, Graph) {
        let source = session.scratch.as_str();
        let trimmed = source.trim();
        let mode = session.mode;

        if trimmed.is_empty() {
            return (session.language.unwrap_or(Language::JavaScript), Graph::new());
        }

        if let Some(language) = session.language.filter(|l| *l != Language::PlainText) {
            let graph = match self.parse(token, language, mode, source).await {
                Ok(ast) => ast.to_graph(mode),
                Err(e) => Graph::syntax_error(&e.to_string()),
            };
            return (language, graph);
        }

        if looks_like_markup(trimmed) {
            return match self.parse(token, Language::Html, mode, source).await {
                Ok(ast) => (Language::Html, ast.to_graph(mode)),
                Err(e) => (Language::PlainText, Graph::syntax_error(&e.to_string())),
            };
        }

        match self.parse(token, Language::JavaScript, mode, source).await {
            Ok(ast) => return (Language::JavaScript, ast.to_graph(mode)),
            Err(e) => debug!("Not JavaScript: {}", e),
        }
        match self.parse(token, Language::Css, mode, source).await {
            Ok(ast) => (Language::Css, ast.to_graph(mode)),
            Err(e) => {
                debug!("Not CSS either: {}", e);
                (Language::PlainText, Graph::syntax_error(&e.to_string()))
            }
        }
    }

    /// Parse through the registry. A parser that is still booting gets a
    /// loading placeholder delivered before the wait.
    async fn parse(
        &self,
        token: Token,
        language: Language,
        mode: FidelityMode,
        source: &str,
    ) -> Result<SourceAst, ParseError> {
        let parser = self.registry.get(language).ok_or(ParseError::Unsupported(language))?;
        if !parser.is_ready() {
            let placeholder = Graph::loading(&loading_subject(language));
            self.deliver(token, ViewMode::Scratch, language, mode, placeholder);
        }
        parser.parse(source).await
    }

    fn deliver(&self, token: Token, view: ViewMode, language: Language, mode: FidelityMode, graph: Graph) -> bool {
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        let update = GraphUpdate {
            sequence: token.sequence(),
            view,
            language,
            mode,
            graph,
        };
        let delivered = self.updates.send_if_modified(|current| {
            if !self.tokens.is_current(token) {
                return false;
            }
            *current = update;
            true
        });
        if delivered {
            info!(sequence = token.sequence(), %language, nodes, edges, "Delivered {:?} graph", view);
        } else {
            warn!(sequence = token.sequence(), "Dropping stale result");
        }
        delivered
    }

    /// Drive the pipeline from an edit stream until it closes.
    ///
    /// Every settled burst is applied to `session` and recomputed in a task
    /// of its own, so a slow parse never holds back newer edits. Returns
    /// the final session once all in-flight work has finished.
    pub async fn run(
        self: Arc<Self>,
        mut session: Session,
        mut edits: mpsc::UnboundedReceiver<Edit>,
        debouncer: Debouncer,
    ) -> Session {
        let mut in_flight = JoinSet::new();
        while let Some(batch) = debouncer.next_batch(&mut edits).await {
            debug!("Applying {} settled edits", batch.len());
            for edit in batch {
                session.apply(edit);
            }
            while let Some(finished) = in_flight.try_join_next() {
                if let Err(e) = finished {
                    error!("Recompute task failed: {}", e);
                }
            }

            let token = self.tokens.issue();
            let pipeline = Arc::clone(&self);
            let snapshot = session.clone();
            in_flight.spawn(async move { pipeline.fire(token, &snapshot).await });
        }

        while let Some(result) = in_flight.join_next().await {
            if let Err(e) = result {
                error!("Recompute task failed: {}", e);
            }
        }
        info!("Edit stream closed");
        session
    }
}
