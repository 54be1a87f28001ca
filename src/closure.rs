use std::collections::{HashSet, VecDeque};

use crate::graph::{Graph, Node};

/// Ordered dependency closure of `root`: the root itself, then every
/// transitively referenced node, breadth-first, each referenced group
/// in body declaration order, each node exactly once. Dangling
/// references are dropped silently; an unknown root is an error.
pub fn closure<'g>(graph: &'g Graph, root: &str) -> Result<Vec<&'g Node>, String> {
    let Some(root_node) = graph.lookup(root) else {
        return Err(format!("unknown label `{root}`"));
    };

    let mut order: Vec<&Node> = vec![root_node];
    let mut seen: HashSet<&str> = HashSet::from([root_node.label.as_str()]);
    let mut queue: VecDeque<&Node> = VecDeque::from([root_node]);

    while let Some(node) = queue.pop_front() {
        for target in &node.refs {
            if seen.contains(target.as_str()) {
                continue;
            }
            let Some(next) = graph.lookup(target) else {
                continue;
            };
            seen.insert(next.label.as_str());
            order.push(next);
            queue.push_back(next);
        }
    }

    Ok(order)
}
