//! CodeFlow Core: graph model, per-pass accumulator, configuration

pub mod config;
pub mod graph;
pub mod model;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use config::{CodeflowConfig, ConfigError, CONFIG_FILE};
pub use graph::{Graph, GraphAccumulator, ERROR_NODE_ID, LOADING_NODE_ID};
pub use model::{
    basename, edge_id, Family, FidelityMode, GraphEdge, GraphNode, Language, LayoutHint, NodeRole,
    Position, ProjectFile, ResolvedImport, Spacing,
};
