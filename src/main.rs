use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use texdeps::{build_graph, closure, dot_renderer, json_renderer, lean, stats, tex_renderer};

#[derive(Parser)]
#[command(
    name = "texdeps",
    about = "Extract dependency graphs from a labelled TeX corpus, optionally cross-linked to a Lean corpus"
)]
struct Cli {
    /// Corpus root directory
    corpus_root: PathBuf,

    /// Lean corpus root to scan for tagged declarations
    #[arg(long, value_name = "DIR")]
    lean: Option<PathBuf>,

    /// Label whose dependency closure to render
    #[arg(long, value_name = "LABEL")]
    root: Option<String>,

    /// Write the closure as a Graphviz DOT file
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Write the closure as a JSON graph document
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Write the closure as a compilable TeX document
    #[arg(long, value_name = "FILE")]
    tex: Option<PathBuf>,

    /// In TeX output, set lemma and definition statements next to
    /// their Lean snippets
    #[arg(long)]
    interleave: bool,

    /// Print whole-graph statistics as JSON on stdout
    #[arg(long)]
    stats: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let graph = build_graph(&cli.corpus_root)?;

    let lean_index = match &cli.lean {
        Some(root) => {
            let tags = lean::load_tag_map(&cli.corpus_root)?;
            Some(lean::scan_lean_corpus(root, &tags)?)
        }
        None => None,
    };

    if cli.stats {
        let stats = stats::Stats::compute(&graph, lean_index.as_ref());
        println!("{}", stats.to_json()?);
        return Ok(());
    }

    if cli.dot.is_none() && cli.json.is_none() && cli.tex.is_none() {
        bail!("nothing to do: pass --stats or an output flag (--dot/--json/--tex)");
    }
    let Some(root_label) = cli.root.as_deref() else {
        bail!("--root LABEL is required with --dot/--json/--tex");
    };
    if cli.interleave && (cli.tex.is_none() || cli.lean.is_none()) {
        tracing::warn!("--interleave has no effect without --tex and --lean");
    }

    let members = closure::closure(&graph, root_label).map_err(anyhow::Error::msg)?;

    if let Some(path) = &cli.dot {
        write_output(path, &dot_renderer::render(&members))?;
    }
    if let Some(path) = &cli.json {
        write_output(path, &json_renderer::render(&members)?)?;
    }
    if let Some(path) = &cli.tex {
        let doc = tex_renderer::render(&members, lean_index.as_ref(), cli.interleave);
        write_output(path, &doc)?;
    }
    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
