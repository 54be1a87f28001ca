use std::collections::HashSet;

use crate::graph::Node;

fn quote(s: &str) -> String {
    s.replace('"', "\\\"")
}

/// Graphviz digraph for a closure: one node line per member, one edge
/// line per reference with both endpoints in the closure.
pub fn render(members: &[&Node]) -> String {
    let in_closure: HashSet<&str> =
        members.iter().map(|n| n.label.as_str()).collect();

    let mut out = String::from("digraph deps {\n  node [shape=box];\n");
    for node in members {
        out.push_str(&format!("  \"{}\";\n", quote(&node.label)));
    }
    for node in members {
        for target in &node.refs {
            if in_closure.contains(target.as_str()) {
                out.push_str(&format!(
                    "  \"{}\" -> \"{}\";\n",
                    quote(&node.label),
                    quote(target)
                ));
            }
        }
    }
    out.push_str("}\n");
    out
}
