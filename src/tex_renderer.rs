use crate::graph::Node;
use crate::lean::LeanIndex;

fn env_block(node: &Node) -> String {
    let mut body = node.body.as_str();
    let mut block = format!("\\begin{{{}}}\n", node.kind.name());
    if body.ends_with('\n') {
        body = &body[..body.len() - 1];
    }
    if !body.is_empty() {
        block.push_str(body);
        block.push('\n');
    }
    block.push_str(&format!("\\end{{{}}}\n", node.kind.name()));
    block
}

/// Statement and Lean snippet as two fixed-width panels.
fn panel_block(node: &Node, code: &str) -> String {
    let mut out = String::new();
    out.push_str("\\noindent\\begin{minipage}[t]{0.48\\linewidth}\n");
    out.push_str(&env_block(node));
    out.push_str("\\end{minipage}\\hfill\\begin{minipage}[t]{0.48\\linewidth}\n");
    out.push_str("\\begin{lstlisting}\n");
    out.push_str(code);
    if !code.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("\\end{lstlisting}\n\\end{minipage}\n\n\\bigskip\n\n");
    out
}

/// Minimal compilable document wrapping each closure member in its
/// environment markup, closure order, root first. With `interleave`,
/// lemma and definition statements that have a Lean snippet are set
/// next to the first snippet; everything else renders standalone.
pub fn render(members: &[&Node], lean: Option<&LeanIndex>, interleave: bool) -> String {
    let mut out = String::from("\\documentclass{article}\n\\usepackage[utf8]{inputenc}\n");
    if interleave {
        out.push_str("\\usepackage{listings}\n");
        out.push_str("\\lstset{basicstyle=\\ttfamily\\small, breaklines=true}\n");
    }
    out.push_str("\\begin{document}\n\n");

    for node in members {
        let snippet = if interleave && node.kind.interleavable() {
            lean.and_then(|index| index.snippets_for(&node.label).first())
        } else {
            None
        };
        match snippet {
            Some(code) => out.push_str(&panel_block(node, code)),
            None => {
                out.push_str(&env_block(node));
                out.push('\n');
            }
        }
    }

    out.push_str("\\end{document}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Kind;
    use pretty_assertions::assert_eq;

    fn node(label: &str, kind: Kind, body: &str) -> Node {
        Node {
            label: label.to_string(),
            kind,
            body: body.to_string(),
            file: "alpha".to_string(),
            refs: Vec::new(),
        }
    }

    fn index_with(label: &str, snippets: &[&str]) -> LeanIndex {
        let mut index = LeanIndex::default();
        for s in snippets {
            index.insert(label.to_string(), s);
        }
        index
    }

    #[test]
    fn wraps_members_in_their_environments() {
        let a = node("lemma-a", Kind::Lemma, "\\label{lemma-a}\nBody.\n");
        let out = render(&[&a], None, false);
        assert!(out.starts_with("\\documentclass{article}\n"));
        assert!(out.contains("\\begin{lemma}\n\\label{lemma-a}\nBody.\n\\end{lemma}\n"));
        assert!(out.ends_with("\\end{document}\n"));
    }

    #[test]
    fn members_appear_in_closure_order() {
        let a = node("lemma-a", Kind::Lemma, "\\label{lemma-a}\nA.\n");
        let b = node("situation-b", Kind::Situation, "\\label{situation-b}\nB.\n");
        let out = render(&[&a, &b], None, false);
        let pos_a = out.find("\\begin{lemma}").unwrap();
        let pos_b = out.find("\\begin{situation}").unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn interleave_sets_lemma_next_to_first_snippet() {
        let a = node("lemma-a", Kind::Lemma, "\\label{lemma-a}\nA.\n");
        let index = index_with("lemma-a", &["lemma a : True := by trivial", "second"]);
        let out = render(&[&a], Some(&index), true);
        assert!(out.contains("minipage"));
        assert!(out.contains("\\begin{lstlisting}\nlemma a : True := by trivial\n"));
        assert!(!out.contains("second"));
    }

    #[test]
    fn interleave_skips_non_interleavable_kinds() {
        let r = node("remark-r", Kind::Remark, "\\label{remark-r}\nR.\n");
        let index = index_with("remark-r", &["lemma r : True := by trivial"]);
        let out = render(&[&r], Some(&index), true);
        assert!(!out.contains("minipage"));
        assert!(out.contains("\\begin{remark}\n"));
    }

    #[test]
    fn interleave_without_snippet_renders_standalone() {
        let a = node("lemma-a", Kind::Lemma, "\\label{lemma-a}\nA.\n");
        let index = index_with("lemma-other", &["unrelated"]);
        let out = render(&[&a], Some(&index), true);
        assert!(!out.contains("minipage"));
        assert!(!out.contains("lstlisting"));
        assert!(out.contains("\\begin{lemma}\n"));
    }

    #[test]
    fn listings_preamble_only_in_interleave_mode() {
        let a = node("lemma-a", Kind::Lemma, "\\label{lemma-a}\nA.\n");
        let plain = render(&[&a], None, false);
        assert!(!plain.contains("listings"));
        let interleaved = render(&[&a], None, true);
        assert!(interleaved.contains("\\usepackage{listings}"));
    }

    #[test]
    fn empty_body_still_produces_matched_markers() {
        let a = node("lemma-a", Kind::Lemma, "");
        let out = render(&[&a], None, false);
        assert!(out.contains("\\begin{lemma}\n\\end{lemma}\n"));
    }

    #[test]
    fn definition_is_interleavable() {
        let d = node("definition-d", Kind::Definition, "\\label{definition-d}\nD.\n");
        let index = index_with("definition-d", &["def d : Nat := 0"]);
        let out = render(&[&d], Some(&index), true);
        assert!(out.contains("minipage"));
        assert_eq!(out.matches("\\begin{lstlisting}").count(), 1);
    }
}
