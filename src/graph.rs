use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Environment names that produce graph nodes. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Definition,
    Lemma,
    Proposition,
    Theorem,
    Corollary,
    Remark,
    Remarks,
    Example,
    Exercise,
    Situation,
    Equation,
}

impl Kind {
    pub fn from_name(name: &str) -> Option<Kind> {
        Some(match name {
            "definition" => Kind::Definition,
            "lemma" => Kind::Lemma,
            "proposition" => Kind::Proposition,
            "theorem" => Kind::Theorem,
            "corollary" => Kind::Corollary,
            "remark" => Kind::Remark,
            "remarks" => Kind::Remarks,
            "example" => Kind::Example,
            "exercise" => Kind::Exercise,
            "situation" => Kind::Situation,
            "equation" => Kind::Equation,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Definition => "definition",
            Kind::Lemma => "lemma",
            Kind::Proposition => "proposition",
            Kind::Theorem => "theorem",
            Kind::Corollary => "corollary",
            Kind::Remark => "remark",
            Kind::Remarks => "remarks",
            Kind::Example => "example",
            Kind::Exercise => "exercise",
            Kind::Situation => "situation",
            Kind::Equation => "equation",
        }
    }

    /// Kinds whose statements are set next to their Lean snippet in
    /// interleaved TeX output.
    pub fn interleavable(&self) -> bool {
        matches!(self, Kind::Lemma | Kind::Definition)
    }
}

/// True when `label` follows the `kind-rest` naming convention for
/// statement labels. Section anchors and bibliography keys fall outside
/// it and never become edges.
pub fn label_has_kind_prefix(label: &str) -> bool {
    match label.split_once('-') {
        Some((head, rest)) => !rest.is_empty() && Kind::from_name(head).is_some(),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub kind: Kind,
    /// Raw text between the open and close markers, verbatim.
    pub body: String,
    /// Originating file stem, for diagnostics only.
    pub file: String,
    /// Referenced labels in body declaration order, deduplicated,
    /// self-references removed.
    pub refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateLabel {
    pub label: String,
    pub kept_file: String,
    pub dropped_file: String,
}

#[derive(Debug, Default)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    duplicates: Vec<DuplicateLabel>,
}

impl Graph {
    /// Merge extracted nodes into one label-keyed graph. The first
    /// declaration of a label wins; later ones are recorded as
    /// duplicates and reported, never silently merged.
    pub fn assemble(nodes: impl IntoIterator<Item = Node>) -> Graph {
        let mut graph = Graph::default();
        for node in nodes {
            match graph.nodes.get(&node.label) {
                Some(existing) => {
                    tracing::warn!(
                        "duplicate label `{}` in {}.tex (already declared in {}.tex)",
                        node.label,
                        node.file,
                        existing.file
                    );
                    graph.duplicates.push(DuplicateLabel {
                        label: node.label.clone(),
                        kept_file: existing.file.clone(),
                        dropped_file: node.file,
                    });
                }
                None => {
                    graph.nodes.insert(node.label.clone(), node);
                }
            }
        }
        graph
    }

    pub fn lookup(&self, label: &str) -> Option<&Node> {
        self.nodes.get(label)
    }

    /// Outgoing references of `label` in body declaration order.
    /// Targets are not guaranteed to resolve to nodes.
    pub fn edges_from(&self, label: &str) -> &[String] {
        self.nodes
            .get(label)
            .map(|n| n.refs.as_slice())
            .unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.values().flat_map(|n| {
            n.refs.iter().map(move |r| (n.label.as_str(), r.as_str()))
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Distinct (from, to) pairs; refs are already deduplicated and
    /// self-filtered at extraction.
    pub fn num_edges(&self) -> usize {
        self.nodes.values().map(|n| n.refs.len()).sum()
    }

    pub fn duplicates(&self) -> &[DuplicateLabel] {
        &self.duplicates
    }
}
