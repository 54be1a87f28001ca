pub mod closure;
pub mod corpus;
pub mod dot_renderer;
pub mod env_parser;
pub mod graph;
pub mod json_renderer;
pub mod lean;
pub mod refs;
pub mod stats;
pub mod tex_renderer;

use std::path::Path;

use anyhow::Result;

use graph::Graph;

/// Scan the corpus under `root` and assemble the dependency graph.
pub fn build_graph(root: &Path) -> Result<Graph> {
    let files = corpus::read_corpus(root)?;
    let mut nodes = Vec::new();
    for file in &files {
        nodes.extend(env_parser::extract_environments(&file.text, &file.stem));
    }
    let graph = Graph::assemble(nodes);
    tracing::debug!(
        "assembled graph: {} nodes, {} edges",
        graph.num_nodes(),
        graph.num_edges()
    );
    Ok(graph)
}
