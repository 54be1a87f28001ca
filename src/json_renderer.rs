use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{Kind, Node};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphDoc {
    pub nodes: Vec<NodeDoc>,
    pub edges: Vec<EdgeDoc>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub label: String,
    pub kind: Kind,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDoc {
    pub from: String,
    pub to: String,
}

/// The closure as a serializable document; edges are restricted to
/// pairs with both endpoints in the closure.
pub fn document(members: &[&Node]) -> GraphDoc {
    let in_closure: HashSet<&str> =
        members.iter().map(|n| n.label.as_str()).collect();

    let nodes = members
        .iter()
        .map(|n| NodeDoc {
            label: n.label.clone(),
            kind: n.kind,
        })
        .collect();
    let edges = members
        .iter()
        .flat_map(|n| {
            n.refs
                .iter()
                .filter(|t| in_closure.contains(t.as_str()))
                .map(|t| EdgeDoc {
                    from: n.label.clone(),
                    to: t.clone(),
                })
        })
        .collect();
    GraphDoc { nodes, edges }
}

pub fn render(members: &[&Node]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&document(members))
}
