//! CLI command implementations

use anyhow::{bail, Context};
use codeflow_adapters::{ParserRegistry, SourceAst, VisitorKeys};
use codeflow_core::{CodeflowConfig, FidelityMode, Graph, Language};
use codeflow_project::{generate_readme, load_project, DependencyGraphBuilder};
use codeflow_watcher::{Debouncer, Edit, FileWatcher, RecomputePipeline, Session};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Explicit tag for files whose extension names a non-JS language. JS and
/// unknown extensions go through auto-detection.
fn tag_from_extension(path: &Path) -> Option<Language> {
    match Language::from_path(&path.to_string_lossy()) {
        Language::JavaScript => None,
        other => Some(other),
    }
}

/// Walk a parser's saved JSON output.
fn graph_from_parser_output(
    path: &Path,
    language: Language,
    mode: FidelityMode,
    visitor_keys: Option<PathBuf>,
) -> anyhow::Result<Graph> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;

    let ast = match (language, visitor_keys) {
        (Language::JavaScript, Some(keys_path)) => {
            let keys_text = std::fs::read_to_string(&keys_path)
                .with_context(|| format!("failed to read {}", keys_path.display()))?;
            let keys = VisitorKeys::from_json(serde_json::from_str(&keys_text)?)
                .with_context(|| format!("invalid visitor keys in {}", keys_path.display()))?;
            SourceAst::JavaScript {
                program: value,
                visitor_keys: Arc::new(keys),
            }
        }
        (_, Some(_)) => bail!("--visitor-keys only applies to javascript"),
        (language, None) => SourceAst::from_json(language, value)
            .with_context(|| format!("{} is not {} parser output", path.display(), language))?,
    };
    Ok(ast.to_graph(mode))
}

pub async fn ast(
    config: &CodeflowConfig,
    file: PathBuf,
    lang: Option<Language>,
    mode: Option<FidelityMode>,
    visitor_keys: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mode = mode.unwrap_or(config.default_mode);

    if is_json(&file) {
        let language = lang.context("--lang is required for parser output")?;
        let graph = graph_from_parser_output(&file, language, mode, visitor_keys)?;
        tracing::info!("{} nodes, {} edges", graph.node_count(), graph.edge_count());
        return print_json(&graph);
    }

    let source = std::fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
    let mut session = Session::new(mode);
    session.apply(Edit::Language(lang.or_else(|| tag_from_extension(&file))));
    session.apply(Edit::Buffer(source));

    let pipeline = RecomputePipeline::new(ParserRegistry::from_config(config), DependencyGraphBuilder::default());
    pipeline.recompute(&session).await;
    print_json(&pipeline.latest())
}

fn load(config: &CodeflowConfig, dir: &Path) -> anyhow::Result<Vec<codeflow_core::ProjectFile>> {
    let files = load_project(dir, config).with_context(|| format!("failed to load project {}", dir.display()))?;
    tracing::info!("Loaded {} files from {}", files.len(), dir.display());
    Ok(files)
}

pub async fn deps(config: &CodeflowConfig, dir: PathBuf) -> anyhow::Result<()> {
    let files = load(config, &dir)?;
    let report = DependencyGraphBuilder::default().build(&files).await;
    if !report.skipped.is_empty() {
        tracing::warn!("Skipped {} unreadable files", report.skipped.len());
    }
    print_json(&report.graph)
}

pub async fn watch(config: &CodeflowConfig, dir: PathBuf) -> anyhow::Result<()> {
    let files = load(config, &dir)?;
    let pipeline = Arc::new(RecomputePipeline::new(
        ParserRegistry::from_config(config),
        DependencyGraphBuilder::default(),
    ));
    let mut updates = pipeline.subscribe();

    let (edits_tx, edits_rx) = mpsc::unbounded_channel();
    edits_tx
        .send(Edit::OpenProject(files))
        .context("edit stream closed before start")?;

    let mut watcher = FileWatcher::new(&dir, config).context("failed to create file watcher")?;
    watcher.start().with_context(|| format!("failed to watch {}", dir.display()))?;
    tokio::spawn(watcher.forward(edits_tx));

    let session = Session::new(config.default_mode);
    tokio::spawn(Arc::clone(&pipeline).run(session, edits_rx, Debouncer::new(config.debounce())));

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let update = updates.borrow_and_update().clone();
                println!("{}", serde_json::to_string(&update)?);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                break;
            }
        }
    }
    Ok(())
}

pub fn readme(config: &CodeflowConfig, dir: PathBuf) -> anyhow::Result<()> {
    let files = load(config, &dir)?;
    let readme = generate_readme(&files, &config.ignore).context("failed to generate README")?;
    print!("{}", readme);
    Ok(())
}
