use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use linexml::{load_document_with_config, Config, Node};

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect line-oriented XML documents", long_about = None)]
struct Args {
    /// Input file path
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Select a descendant by child names, e.g. `server/port`
    #[arg(short, long)]
    path: Option<String>,

    /// Print only this attribute of the selected element
    #[arg(short, long)]
    attr: Option<String>,

    /// Maximum element nesting depth (0 means unlimited)
    #[arg(long, default_value_t = linexml::scanner::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() {
    // Initialize the default subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    info!("Reading file: {}", args.input.display());
    let config = Config::default().with_max_depth(args.max_depth);
    let root = load_document_with_config(&args.input, config)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    let selected = match &args.path {
        Some(path) => root
            .lookup(path)
            .ok_or_else(|| anyhow!("no element at path {path}"))?,
        None => &root,
    };

    match &args.attr {
        Some(key) => {
            let value = selected
                .attribute(key)
                .ok_or_else(|| anyhow!("<{}> has no attribute {key}", selected.name()))?;
            println!("{value}");
        }
        None => print!("{}", outline(selected)),
    }

    Ok(())
}

/// Indented summary of a subtree, children in document order
fn outline(node: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![(node, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let _ = write!(out, "{:indent$}{}", "", node.name(), indent = depth * 2);
        for (key, value) in node.attributes() {
            let _ = write!(out, " {key}=\"{value}\"");
        }
        if let Some(data) = node.data() {
            let _ = write!(out, ": {}", data.trim());
        }
        out.push('\n');

        let children: Vec<&Node> = node.children_in_order().collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_lists_children_in_document_order() -> linexml::Result<()> {
        let root = linexml::from_str("<a x=\"1\">\n<c/>\n<b>hi</b>\n<c/>\n</a>")?;
        assert_eq!(outline(&root), "a x=\"1\"\n  c\n  b: hi\n  c\n");
        Ok(())
    }
}
