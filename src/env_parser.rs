use winnow::prelude::*;
use winnow::token::take_while;

use crate::graph::{Kind, Node};
use crate::refs::references;

fn begin_env(input: &mut &str) -> winnow::Result<Kind> {
    "\\begin{".parse_next(input)?;
    let name = take_while(1.., |c: char| c.is_ascii_alphabetic())
        .parse_next(input)?;
    "}".parse_next(input)?;
    match Kind::from_name(name) {
        Some(kind) => Ok(kind),
        None => Err(winnow::error::ParserError::from_input(input)),
    }
}

fn label_decl(input: &mut &str) -> winnow::Result<String> {
    "\\label{".parse_next(input)?;
    let label = take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '-'
    })
    .parse_next(input)?;
    "}".parse_next(input)?;
    Ok(label.to_string())
}

/// A line that is nothing but a label declaration; such a line directly
/// before `\begin{...}` labels the following environment.
fn bare_label_line(trimmed: &str) -> Option<String> {
    let mut rest = trimmed;
    let label = label_decl(&mut rest).ok()?;
    rest.trim().is_empty().then_some(label)
}

struct OpenEnv {
    kind: Kind,
    /// Label carried over from a line preceding the begin marker.
    preceding: Option<String>,
    label: Option<String>,
    body: String,
    saw_content: bool,
}

impl OpenEnv {
    fn new(kind: Kind, preceding: Option<String>) -> OpenEnv {
        OpenEnv {
            kind,
            preceding,
            label: None,
            body: String::new(),
            saw_content: false,
        }
    }

    fn push_body(&mut self, line: &str) {
        self.scan_label(line);
        if self.body.is_empty() && line.is_empty() {
            return;
        }
        self.body.push_str(line);
        self.body.push('\n');
    }

    /// The label must be the first meaningful content of the body;
    /// blank and `%` comment lines do not count as content.
    fn scan_label(&mut self, line: &str) {
        if self.label.is_some() || self.saw_content {
            return;
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            return;
        }
        let mut rest = trimmed;
        match label_decl(&mut rest) {
            Ok(label) => self.label = Some(label),
            Err(_) => self.saw_content = true,
        }
    }

    fn into_node(self, file: &str) -> Option<Node> {
        let label = self.label.or(self.preceding)?;
        let mut refs = references(&self.body);
        refs.retain(|r| r != &label);
        Some(Node {
            label,
            kind: self.kind,
            body: self.body,
            file: file.to_string(),
            refs,
        })
    }
}

/// Feed one line (or the tail of the begin line) to an open environment.
/// Returns the environment if it is still open after the line.
fn advance(
    mut env: OpenEnv,
    line: &str,
    file: &str,
    nodes: &mut Vec<Node>,
) -> Option<OpenEnv> {
    let closer = format!("\\end{{{}}}", env.kind.name());
    match line.find(&closer) {
        Some(pos) => {
            let before = &line[..pos];
            if !before.trim().is_empty() {
                env.push_body(before);
            }
            let kind = env.kind;
            match env.into_node(file) {
                Some(node) => nodes.push(node),
                None => tracing::warn!(
                    "unlabelled {} environment in {}.tex; skipped",
                    kind.name(),
                    file
                ),
            }
            None
        }
        None => {
            env.push_body(line);
            Some(env)
        }
    }
}

/// Extract every labelled environment of `text` as a Node. Malformed
/// environments are skipped with a diagnostic; they never abort the
/// rest of the file.
pub fn extract_environments(text: &str, file: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut open: Option<OpenEnv> = None;
    let mut preceding_label: Option<String> = None;

    for line in text.lines() {
        match open.take() {
            None => {
                let trimmed = line.trim_start();
                let mut rest = trimmed;
                if let Ok(kind) = begin_env(&mut rest) {
                    let env = OpenEnv::new(kind, preceding_label.take());
                    let rest = rest.trim_start();
                    open = if rest.is_empty() {
                        Some(env)
                    } else {
                        advance(env, rest, file, &mut nodes)
                    };
                } else {
                    preceding_label = bare_label_line(trimmed);
                }
            }
            Some(env) => {
                open = advance(env, line, file, &mut nodes);
            }
        }
    }

    if let Some(env) = open {
        tracing::warn!(
            "unterminated {} environment in {}.tex; skipped",
            env.kind.name(),
            file
        );
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_multi_line_environment() {
        let text = "\\begin{lemma}\n\\label{lemma-a}\nBody text.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "lemma-a");
        assert_eq!(nodes[0].kind, Kind::Lemma);
        assert_eq!(nodes[0].file, "alpha");
        assert_eq!(nodes[0].body, "\\label{lemma-a}\nBody text.\n");
    }

    #[test]
    fn extracts_single_line_environment() {
        let text = "\\begin{lemma}\\label{lemma-a}A\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "lemma-a");
        assert_eq!(nodes[0].body, "\\label{lemma-a}A\n");
    }

    #[test]
    fn collects_references_from_body() {
        let text = "\\begin{lemma}\n\\label{lemma-b}\nBy \\ref{lemma-a} and \\ref{situation-setup}.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes[0].refs, ["lemma-a", "situation-setup"]);
    }

    #[test]
    fn filters_self_references() {
        let text = "\\begin{lemma}\n\\label{lemma-a}\nAs in \\ref{lemma-a}, see \\ref{lemma-b}.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes[0].refs, ["lemma-b"]);
    }

    #[test]
    fn skips_unlabelled_environment() {
        let text = "\\begin{lemma}\nNo label here.\n\\end{lemma}\n\\begin{lemma}\n\\label{lemma-b}\nOk.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "lemma-b");
    }

    #[test]
    fn skips_environment_whose_label_is_not_first() {
        let text = "\\begin{lemma}\nSome text first.\n\\label{lemma-a}\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert!(nodes.is_empty());
    }

    #[test]
    fn label_after_comment_lines_still_counts() {
        let text = "\\begin{lemma}\n% internal note\n\n\\label{lemma-a}\nBody.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "lemma-a");
    }

    #[test]
    fn label_line_preceding_begin_labels_the_environment() {
        let text = "\\label{lemma-a}\n\\begin{lemma}\nBody.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "lemma-a");
    }

    #[test]
    fn stale_preceding_label_is_not_used() {
        let text = "\\label{lemma-a}\nIntervening text.\n\\begin{lemma}\nBody.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert!(nodes.is_empty());
    }

    #[test]
    fn skips_unterminated_environment() {
        let text = "\\begin{lemma}\n\\label{lemma-a}\nNever closed.\n";
        let nodes = extract_environments(text, "alpha");
        assert!(nodes.is_empty());
    }

    #[test]
    fn unterminated_environment_does_not_break_earlier_ones() {
        let text = "\\begin{lemma}\n\\label{lemma-a}\nOk.\n\\end{lemma}\n\\begin{lemma}\n\\label{lemma-b}\nNever closed.\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "lemma-a");
    }

    #[test]
    fn ignores_unrecognized_environments() {
        let text = "\\begin{align}\n\\label{lemma-x}\nx = y\n\\end{align}\n";
        let nodes = extract_environments(text, "alpha");
        assert!(nodes.is_empty());
    }

    #[test]
    fn nested_other_environment_stays_in_body() {
        let text = "\\begin{lemma}\n\\label{lemma-a}\n\\begin{equation}\n\\label{equation-inner}\nx = y\n\\end{equation}\nDone.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "lemma-a");
        assert!(nodes[0].body.contains("\\begin{equation}"));
        assert!(nodes[0].body.contains("\\end{equation}"));
    }

    #[test]
    fn body_is_preserved_verbatim() {
        let text = "\\begin{definition}\n\\label{definition-d}\n  indented $x$\n\n  more\n\\end{definition}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes[0].body, "\\label{definition-d}\n  indented $x$\n\n  more\n");
    }

    #[test]
    fn extracts_several_environments_per_file() {
        let text = "\\begin{situation}\n\\label{situation-setup}\nLet $X$ be a scheme.\n\\end{situation}\n\ntext between\n\n\\begin{lemma}\n\\label{lemma-silly}\nIn \\ref{situation-setup} we win.\n\\end{lemma}\n";
        let nodes = extract_environments(text, "alpha");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].label, "situation-setup");
        assert_eq!(nodes[1].label, "lemma-silly");
        assert_eq!(nodes[1].refs, ["situation-setup"]);
    }
}
