//! Test utilities for CodeFlow core

use crate::graph::{Graph, GraphAccumulator};
use crate::model::{Family, LayoutHint, NodeRole};

/// Build a graph from `(label, parent index)` pairs, depth-first order.
pub fn tree_graph(family: Family, spec: &[(&str, Option<usize>)]) -> Graph {
    let mut acc = GraphAccumulator::new(family);
    let mut ids: Vec<(String, usize)> = Vec::new();
    for (i, (label, parent)) in spec.iter().enumerate() {
        let (parent_id, depth) = match parent {
            Some(p) => (Some(ids[*p].0.clone()), ids[*p].1 + 1),
            None => (None, 0),
        };
        let hint = LayoutHint { depth, sibling_index: i };
        let id = acc.attach(parent_id.as_deref(), *label, NodeRole::for_depth(depth), hint);
        ids.push((id, depth));
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_graph_shape() {
        let graph = tree_graph(Family::Js, &[("Program", None), ("ExpressionStatement", Some(0))]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges[0].source, "js-0");
        assert_eq!(graph.edges[0].target, "js-1");
    }
}
