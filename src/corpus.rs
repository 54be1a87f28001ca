use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub struct SourceFile {
    pub stem: String,
    pub text: String,
}

/// File stems named by the `LIJST = ...` variable of a Makefile,
/// honoring backslash continuations, in listed order.
fn makefile_stems(makefile: &str) -> Option<Vec<String>> {
    let mut lines = makefile.lines();
    let mut line = loop {
        match lines.next() {
            Some(l) if l.starts_with("LIJST = ") => break l,
            Some(_) => continue,
            None => return None,
        }
    };
    let mut items = String::new();
    loop {
        let stripped = line.trim_end();
        match stripped.strip_suffix('\\') {
            Some(head) => {
                items.push(' ');
                items.push_str(head);
                line = lines.next().unwrap_or("");
            }
            None => {
                items.push(' ');
                items.push_str(stripped);
                break;
            }
        }
    }
    let items = items.replace("LIJST = ", "");
    Some(items.split_whitespace().map(str::to_string).collect())
}

/// Deterministic corpus file list: the Makefile's LIJST when the root
/// has one, otherwise every `*.tex` directly under the root sorted by
/// name. `chapters.tex` is an inclusion wrapper, not content.
pub fn list_corpus_files(root: &Path) -> Result<Vec<PathBuf>> {
    let makefile = root.join("Makefile");
    if makefile.is_file() {
        let text = fs::read_to_string(&makefile)
            .with_context(|| format!("failed to read {}", makefile.display()))?;
        if let Some(stems) = makefile_stems(&text) {
            return Ok(stems
                .into_iter()
                .map(|stem| root.join(format!("{stem}.tex")))
                .collect());
        }
    }

    let entries = fs::read_dir(root)
        .with_context(|| format!("failed to read corpus root {}", root.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("tex"))
        .filter(|path| {
            path.file_name().and_then(|n| n.to_str()) != Some("chapters.tex")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Read every corpus file. A stem listed in the Makefile with no file
/// on disk is skipped with a diagnostic; an unreadable file is fatal.
pub fn read_corpus(root: &Path) -> Result<Vec<SourceFile>> {
    let mut out = Vec::new();
    for path in list_corpus_files(root)? {
        if !path.is_file() {
            tracing::warn!("listed file {} does not exist; skipped", path.display());
            continue;
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.push(SourceFile { stem, text });
    }
    tracing::debug!("read {} corpus files from {}", out.len(), root.display());
    Ok(out)
}
