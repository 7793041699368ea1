//! Graph container and the per-pass accumulator every walker appends to

use crate::model::*;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Id of the placeholder node shown when a buffer fails to parse.
pub const ERROR_NODE_ID: &str = "error";

/// Id of the placeholder node shown while a parser bootstraps.
pub const LOADING_NODE_ID: &str = "loading";

/// Nodes and edges in insertion order, as delivered to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    /// Single-node graph reporting a parse failure.
    pub fn syntax_error(message: &str) -> Self {
        Graph::placeholder(ERROR_NODE_ID, format!("Syntax Error: {}", message))
    }

    /// Single-node graph shown while a slow parser is still starting up.
    pub fn loading(what: &str) -> Self {
        Graph::placeholder(LOADING_NODE_ID, format!("Loading {}...", what))
    }

    fn placeholder(id: &str, label: String) -> Self {
        Graph {
            nodes: vec![GraphNode {
                id: id.to_string(),
                label,
                kind: NodeRole::Output,
                layout_hint: LayoutHint::default(),
                position: Position { x: 100.0, y: 100.0 },
                external: false,
            }],
            edges: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    /// Edges whose source or target is not a node of this graph.
    pub fn dangling_edges(&self) -> Vec<&GraphEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }

    /// Every edge references nodes present in this graph.
    pub fn is_closed(&self) -> bool {
        self.dangling_edges().is_empty()
    }

    /// Topology as (source label, target label) pairs, in edge order.
    /// Independent of the id scheme, so two passes can be compared.
    pub fn label_topology(&self) -> Vec<(&str, &str)> {
        let labels: HashMap<&str, &str> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.label.as_str()))
            .collect();
        self.edges
            .iter()
            .filter_map(|e| Some((*labels.get(e.source.as_str())?, *labels.get(e.target.as_str())?)))
            .collect()
    }

    /// Directed petgraph view with node ids as weights. Dangling edges are
    /// left out.
    pub fn to_digraph(&self) -> DiGraph<String, Option<String>> {
        let mut graph = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for node in &self.nodes {
            let idx = graph.add_node(node.id.clone());
            index.insert(node.id.as_str(), idx);
        }
        for edge in &self.edges {
            if let (Some(&s), Some(&t)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                graph.add_edge(s, t, edge.label.clone());
            }
        }
        graph
    }
}

/// Mutable node/edge sequences owned by a single walk.
///
/// Ids are `<family>-<n>` where `n` is the node count at the moment of
/// creation, so they are unique within the pass and restart at zero on the
/// next one.
#[derive(Debug)]
pub struct GraphAccumulator {
    family: Family,
    graph: Graph,
}

impl GraphAccumulator {
    pub fn new(family: Family) -> Self {
        GraphAccumulator {
            family,
            graph: Graph::new(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Id the next node will receive.
    pub fn next_id(&self) -> String {
        format!("{}-{}", self.family.prefix(), self.graph.nodes.len())
    }

    /// Append a node and, when `parent` is given, the edge into it.
    /// Returns the new node's id.
    pub fn attach(
        &mut self,
        parent: Option<&str>,
        label: impl Into<String>,
        kind: NodeRole,
        hint: LayoutHint,
    ) -> String {
        let id = self.next_id();
        self.graph.nodes.push(GraphNode {
            id: id.clone(),
            label: label.into(),
            kind,
            layout_hint: hint,
            position: self.family.spacing().position(hint),
            external: false,
        });
        if let Some(parent) = parent {
            self.graph.edges.push(GraphEdge::between(parent, &id));
        }
        id
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn finish(self) -> Graph {
        tracing::trace!(
            family = self.family.prefix(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "walk finished"
        );
        self.graph
    }
}
