use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;
use winnow::ascii::{space0, space1, Caseless};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::graph::label_has_kind_prefix;

const URL_NEEDLE: &str = "stacks.math.columbia.edu/tag/";

/// Mapping from short tag identifiers to statement labels, loaded from
/// the corpus's `tags/tags` file (`TAG,label` lines).
#[derive(Debug, Default)]
pub struct TagMap {
    map: BTreeMap<String, String>,
}

impl TagMap {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve a recognized identifier to a statement label: known tags
    /// map through the tag file; an identifier that is itself a
    /// kind-prefixed label is taken verbatim; anything else is dropped.
    pub fn resolve(&self, id: &str) -> Option<String> {
        if let Some(label) = self.map.get(&id.to_ascii_uppercase()) {
            return Some(label.clone());
        }
        label_has_kind_prefix(id).then(|| id.to_string())
    }
}

/// Load `tags/tags` under the corpus root. A missing file is an empty
/// map, not an error.
pub fn load_tag_map(corpus_root: &Path) -> Result<TagMap> {
    let path = corpus_root.join("tags").join("tags");
    if !path.is_file() {
        return Ok(TagMap::default());
    }
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut map = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((tag, label)) = line.split_once(',') {
            map.insert(tag.to_ascii_uppercase(), label.to_string());
        }
    }
    Ok(TagMap { map })
}

/// One-to-many association from statement labels to Lean declaration
/// snippets, accumulated over the whole Lean corpus.
#[derive(Debug, Default)]
pub struct LeanIndex {
    snippets: BTreeMap<String, Vec<String>>,
}

impl LeanIndex {
    pub(crate) fn insert(&mut self, label: String, snippet: &str) {
        let entry = self.snippets.entry(label).or_default();
        if !entry.iter().any(|s| s == snippet) {
            entry.push(snippet.to_string());
        }
    }

    pub fn snippets_for(&self, label: &str) -> &[String] {
        self.snippets.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total snippets across all labels.
    pub fn num_snippets(&self) -> usize {
        self.snippets.values().map(Vec::len).sum()
    }

    /// Distinct labels with at least one snippet.
    pub fn num_labels(&self) -> usize {
        self.snippets.len()
    }
}

fn tag_id(input: &mut &str) -> winnow::Result<String> {
    let id = take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-')
        .parse_next(input)?;
    Ok(id.to_string())
}

fn stacks_attr(input: &mut &str) -> winnow::Result<String> {
    "@[".parse_next(input)?;
    space0.parse_next(input)?;
    "stacks".parse_next(input)?;
    space1.parse_next(input)?;
    tag_id.parse_next(input)
}

fn tag_url(input: &mut &str) -> winnow::Result<String> {
    URL_NEEDLE.parse_next(input)?;
    tag_id.parse_next(input)
}

fn doc_phrase(input: &mut &str) -> winnow::Result<String> {
    Caseless("stacks").parse_next(input)?;
    space1.parse_next(input)?;
    Caseless("tag").parse_next(input)?;
    space1.parse_next(input)?;
    tag_id.parse_next(input)
}

/// Run a marker parser at every occurrence of `needle` in `line`.
fn scan_for<T>(
    line: &str,
    needle: &str,
    parser: impl Fn(&mut &str) -> winnow::Result<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    let mut rest = line;
    while let Some(pos) = rest.find(needle) {
        let mut slice = &rest[pos..];
        match parser(&mut slice) {
            Ok(value) => {
                out.push(value);
                rest = slice;
            }
            Err(_) => rest = &rest[pos + needle.len()..],
        }
    }
    out
}

/// `Stacks Tag ID` occurrences, case-insensitive.
fn scan_doc_phrase(line: &str) -> Vec<String> {
    let lower = line.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut base = 0;
    while let Some(pos) = lower[base..].find("stacks") {
        let at = base + pos;
        let mut slice = &line[at..];
        if let Ok(id) = doc_phrase(&mut slice) {
            out.push(id);
        }
        base = at + "stacks".len();
    }
    out
}

const DECL_KEYWORDS: [&str; 7] = [
    "lemma",
    "theorem",
    "def",
    "definition",
    "structure",
    "class",
    "instance",
];

fn decl_header(input: &mut &str) -> winnow::Result<()> {
    let keyword = take_while(1.., |c: char| c.is_ascii_alphabetic())
        .parse_next(input)?;
    if !DECL_KEYWORDS.contains(&keyword) {
        return Err(winnow::error::ParserError::from_input(input));
    }
    space1.parse_next(input)?;
    take_while(1.., |c: char| {
        c.is_alphanumeric() || c == '_' || c == '.'
    })
    .parse_next(input)?;
    Ok(())
}

fn is_decl_header(trimmed: &str) -> bool {
    let mut rest = trimmed;
    decl_header(&mut rest).is_ok()
}

/// One linear pass over a Lean file. Tag identifiers recognized on
/// lines before a declaration header (attribute, docstring phrase,
/// stray tag URL) attach to that declaration; URLs inside the
/// declaration attach to it as well. The snippet runs from the header
/// line to the next blank line or end of file.
fn scan_lean_file(text: &str, tags: &TagMap, index: &mut LeanIndex) {
    let lines: Vec<&str> = text.lines().collect();
    let mut pending: Vec<String> = Vec::new();
    let mut in_doc = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if !in_doc && is_decl_header(trimmed) {
            let mut end = i + 1;
            while end < lines.len() && !lines[end].trim().is_empty() {
                end += 1;
            }
            let snippet_lines = &lines[i..end];
            let snippet = snippet_lines.join("\n");

            let mut ids = std::mem::take(&mut pending);
            for snippet_line in snippet_lines {
                ids.extend(scan_for(snippet_line, URL_NEEDLE, tag_url));
            }
            for id in ids {
                if let Some(label) = tags.resolve(&id) {
                    index.insert(label, &snippet);
                }
            }
            i = end;
            continue;
        }

        pending.extend(scan_for(line, "@[", stacks_attr));
        if in_doc || trimmed.starts_with("/--") || trimmed.starts_with("--") {
            pending.extend(scan_doc_phrase(line));
        }
        pending.extend(scan_for(line, URL_NEEDLE, tag_url));

        if trimmed.starts_with("/--") && !line.contains("-/") {
            in_doc = true;
        } else if in_doc && line.contains("-/") {
            in_doc = false;
        }

        i += 1;
    }
}

/// Walk every `*.lean` file under `root` (sorted, for determinism) and
/// build the label → snippets index.
pub fn scan_lean_corpus(root: &Path, tags: &TagMap) -> Result<LeanIndex> {
    let mut index = LeanIndex::default();
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    for entry in walker {
        let entry = entry
            .with_context(|| format!("failed to walk lean corpus {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("lean") {
            continue;
        }
        let text = fs::read_to_string(entry.path())
            .with_context(|| format!("failed to read {}", entry.path().display()))?;
        scan_lean_file(&text, tags, &mut index);
    }
    tracing::debug!(
        "lean corpus {}: {} labels, {} snippets",
        root.display(),
        index.num_labels(),
        index.num_snippets()
    );
    Ok(index)
}
