use serde::Serialize;

use crate::graph::Graph;
use crate::lean::LeanIndex;

/// Whole-graph aggregate counts. The Lean fields are present only when
/// an external corpus was scanned.
#[derive(Debug, PartialEq, Serialize)]
pub struct Stats {
    pub num_nodes: usize,
    pub num_edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_lean_snippets: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_nodes_with_lean_snippet: Option<usize>,
}

impl Stats {
    pub fn compute(graph: &Graph, lean: Option<&LeanIndex>) -> Stats {
        Stats {
            num_nodes: graph.num_nodes(),
            num_edges: graph.num_edges(),
            num_lean_snippets: lean.map(|index| index.num_snippets()),
            num_nodes_with_lean_snippet: lean.map(|index| {
                graph
                    .nodes()
                    .filter(|n| !index.snippets_for(&n.label).is_empty())
                    .count()
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
