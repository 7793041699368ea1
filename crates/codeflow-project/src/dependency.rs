//! Project-wide file dependency graph
//!
//! One node per project file, laid out five to a row. Every resolved import
//! becomes an edge from the imported file to the importer; anything that
//! does not resolve to a project file is drawn as an external node below the
//! grid.

use std::collections::HashSet;
use std::sync::Arc;

use codeflow_core::{edge_id, Graph, GraphEdge, GraphNode, LayoutHint, NodeRole, ProjectFile, ResolvedImport, Spacing};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, warn};

use crate::imports::{is_script_path, ImportScanner, TreeSitterImportScanner};
use crate::resolver::{is_relative, normalize_relative, resolve_import_path, KnownPaths};

/// Grid columns for file nodes.
pub const COLUMNS: usize = 5;

/// Edge label marking a dependency outside the project.
pub const EXTERNAL_LABEL: &str = "external";

const GRID: Spacing = Spacing::new(200.0, 100.0);

/// Everything one build produces.
#[derive(Debug, Clone, Default)]
pub struct DependencyReport {
    pub graph: Graph,
    /// Every import seen, in file then source order.
    pub imports: Vec<ResolvedImport>,
    /// Files whose imports could not be read.
    pub skipped: Vec<String>,
    /// Groups of project files that import each other, each sorted.
    pub cycles: Vec<Vec<String>>,
}

impl DependencyReport {
    /// Files importing `path`.
    pub fn importers_of(&self, path: &str) -> Vec<String> {
        self.neighbors(path, Direction::Outgoing)
    }

    /// What `path` imports, project files and externals alike.
    pub fn dependencies_of(&self, path: &str) -> Vec<String> {
        self.neighbors(path, Direction::Incoming)
    }

    fn neighbors(&self, path: &str, direction: Direction) -> Vec<String> {
        let digraph = self.graph.to_digraph();
        let Some(start) = digraph.node_indices().find(|i| digraph[*i] == path) else {
            return Vec::new();
        };
        let mut found: Vec<String> = digraph
            .neighbors_directed(start, direction)
            .map(|i| digraph[i].clone())
            .collect();
        found.sort();
        found.dedup();
        found
    }
}

pub struct DependencyGraphBuilder {
    scanner: Arc<dyn ImportScanner>,
}

impl Default for DependencyGraphBuilder {
    fn default() -> Self {
        DependencyGraphBuilder::new(Arc::new(TreeSitterImportScanner::new()))
    }
}

impl DependencyGraphBuilder {
    pub fn new(scanner: Arc<dyn ImportScanner>) -> Self {
        DependencyGraphBuilder { scanner }
    }

    /// Build the dependency graph of `files`. A file that fails to scan is
    /// skipped; the build itself never fails.
    pub async fn build(&self, files: &[ProjectFile]) -> DependencyReport {
        let known: KnownPaths = files.iter().map(|f| f.path.clone()).collect();
        let mut graph = Graph::new();
        let mut edge_ids: HashSet<String> = HashSet::new();
        let mut imports = Vec::new();
        let mut skipped = Vec::new();
        let mut externals = 0usize;
        let rows = files.len().div_ceil(COLUMNS);

        for (i, file) in files.iter().enumerate() {
            let hint = LayoutHint {
                depth: i / COLUMNS,
                sibling_index: i % COLUMNS,
            };
            graph.add_node(GraphNode {
                id: file.path.clone(),
                label: file.file_name().to_string(),
                kind: NodeRole::Default,
                layout_hint: hint,
                position: GRID.position(hint),
                external: false,
            });
        }

        for file in files.iter().filter(|f| is_script_path(&f.path)) {
            let specifiers = match self.scanner.scan(&file.path, &file.content).await {
                Ok(specifiers) => specifiers,
                Err(e) => {
                    warn!("Skipping {}: {}", file.path, e);
                    skipped.push(file.path.clone());
                    continue;
                }
            };

            for specifier in specifiers {
                let resolved = resolve_import_path(&file.path, &specifier, &known);
                imports.push(ResolvedImport {
                    from_path: file.path.clone(),
                    to_path: resolved.clone(),
                    is_external: !is_relative(&specifier),
                });

                let (target, in_project) = match resolved {
                    Some(path) if known.contains(&path) => (path, true),
                    Some(path) => (path, false),
                    None => (normalize_relative(&file.path, &specifier), false),
                };

                let id = edge_id(&file.path, &target);
                if !edge_ids.insert(id.clone()) {
                    continue;
                }

                if !in_project && !graph.contains_node(&target) {
                    // Rows below the file grid, leaving one row of space.
                    let hint = LayoutHint {
                        depth: rows + 1 + externals / COLUMNS,
                        sibling_index: externals % COLUMNS,
                    };
                    externals += 1;
                    graph.add_node(GraphNode {
                        id: target.clone(),
                        label: target.clone(),
                        kind: NodeRole::Default,
                        layout_hint: hint,
                        position: GRID.position(hint),
                        external: true,
                    });
                }

                graph.add_edge(GraphEdge {
                    id,
                    source: target,
                    target: file.path.clone(),
                    label: (!in_project).then(|| EXTERNAL_LABEL.to_string()),
                    emphasized: in_project,
                });
            }
        }

        let cycles = import_cycles(&graph);
        for cycle in &cycles {
            warn!("Import cycle: {}", cycle.join(" -> "));
        }
        debug!(
            files = files.len(),
            edges = graph.edge_count(),
            externals,
            skipped = skipped.len(),
            "dependency graph built"
        );

        DependencyReport {
            graph,
            imports,
            skipped,
            cycles,
        }
    }
}

/// Strongly connected groups of size > 1, plus files importing themselves.
pub fn import_cycles(graph: &Graph) -> Vec<Vec<String>> {
    let digraph: DiGraph<String, Option<String>> = graph.to_digraph();
    let self_loop = |i: NodeIndex| digraph.contains_edge(i, i);
    let mut cycles: Vec<Vec<String>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.first().is_some_and(|i| self_loop(*i)))
        .map(|scc| {
            let mut ids: Vec<String> = scc.into_iter().map(|i| digraph[i].clone()).collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn build(files: &[(&str, &str)]) -> DependencyReport {
        let files: Vec<ProjectFile> = files.iter().map(|(p, c)| ProjectFile::new(*p, *c)).collect();
        DependencyGraphBuilder::default().build(&files).await
    }

    #[tokio::test]
    async fn two_file_project() {
        let report = build(&[("a.js", "import {x} from './b'"), ("b.js", "export const x = 1")]).await;
        let graph = &report.graph;
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.labels(), vec!["a.js", "b.js"]);
        assert_eq!(graph.edge_count(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.source, "b.js");
        assert_eq!(edge.target, "a.js");
        assert_eq!(edge.id, "e-a.js-to-b.js");
        assert!(edge.emphasized);
        assert_eq!(edge.label, None);
        assert!(report.cycles.is_empty());
    }

    #[tokio::test]
    async fn grid_layout() {
        let names: Vec<String> = (0..7).map(|i| format!("f{}.css", i)).collect();
        let files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "")).collect();
        let report = build(&files).await;
        let positions: Vec<(f32, f32)> = report.graph.nodes.iter().map(|n| (n.position.x, n.position.y)).collect();
        assert_eq!(positions[4], (800.0, 0.0));
        assert_eq!(positions[5], (0.0, 100.0));
        assert_eq!(positions[6], (200.0, 100.0));
        assert!(report.graph.edges.is_empty());
    }

    #[tokio::test]
    async fn externals_are_shared_and_labeled() {
        let report = build(&[
            ("src/a.js", "import React from 'react';"),
            ("src/b.jsx", "import React from 'react';\nimport './missing';"),
        ])
        .await;
        let graph = &report.graph;
        let react = graph.node("react").unwrap();
        assert!(react.external);
        assert_eq!(react.label, "react");
        assert_eq!(react.position.y, 200.0);
        assert_eq!(graph.nodes.iter().filter(|n| n.id == "react").count(), 1);

        let missing = graph.node("src/missing").unwrap();
        assert!(missing.external);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.edges.iter().all(|e| e.label.as_deref() == Some(EXTERNAL_LABEL) && !e.emphasized));
        assert!(graph.is_closed());

        assert_eq!(report.imports.len(), 3);
        assert!(report.imports[0].is_external);
        assert_eq!(report.imports[2].to_path, None);
    }

    #[tokio::test]
    async fn duplicate_imports_make_one_edge() {
        let report = build(&[
            ("main.js", "import { a } from './lib';\nimport { b } from './lib.js';"),
            ("lib.js", ""),
        ])
        .await;
        assert_eq!(report.graph.edge_count(), 1);
        assert_eq!(report.imports.len(), 2);
    }

    #[tokio::test]
    async fn cycles_and_queries() {
        let report = build(&[
            ("a.js", "import './b';"),
            ("b.js", "import './a';"),
            ("c.js", "import './a';\nimport 'lodash';"),
        ])
        .await;
        assert_eq!(report.cycles, vec![vec!["a.js".to_string(), "b.js".to_string()]]);
        assert_eq!(report.importers_of("a.js"), vec!["b.js", "c.js"]);
        assert_eq!(report.dependencies_of("c.js"), vec!["a.js", "lodash"]);
        assert!(report.importers_of("nope.js").is_empty());
    }

    #[tokio::test]
    async fn non_script_files_are_not_scanned() {
        let report = build(&[("style.css", "@import './other.css';"), ("other.css", "")]).await;
        assert!(report.graph.edges.is_empty());
        assert!(report.imports.is_empty());
    }
}
