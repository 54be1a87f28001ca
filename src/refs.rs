use winnow::prelude::*;
use winnow::token::take_while;

use crate::graph::label_has_kind_prefix;

fn ref_marker(input: &mut &str) -> winnow::Result<String> {
    "\\ref{".parse_next(input)?;
    let label = take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '-'
    })
    .parse_next(input)?;
    "}".parse_next(input)?;
    Ok(label.to_string())
}

/// Labels referenced from a body via `\ref{...}`, in order of first
/// occurrence, deduplicated. Only labels carrying a recognized kind
/// prefix count; `\cite{...}` and section refs never match.
pub fn references(body: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut rest = body;
    while let Some(pos) = rest.find("\\ref{") {
        let mut slice = &rest[pos..];
        match ref_marker(&mut slice) {
            Ok(label) => {
                rest = slice;
                if label_has_kind_prefix(&label) && !out.contains(&label) {
                    out.push(label);
                }
            }
            Err(_) => rest = &rest[pos + "\\ref{".len()..],
        }
    }
    out
}
