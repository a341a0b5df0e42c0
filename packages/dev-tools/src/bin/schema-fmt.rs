//! Schema Formatter
//!
//! Loads a JSON Schema document into the editor tree, checks that the tree and
//! the schema agree, and prints the result. Exits non-zero when the document
//! cannot be read or parsed, or when it is inconsistent (for example a
//! `required` entry naming a missing property).
//!
//! # Usage
//!
//! ```bash
//! # Pretty-print a schema file
//! cargo run --bin schema-fmt -- schema.json
//!
//! # Read from stdin and print an outline of the property tree instead
//! cat schema.json | cargo run --bin schema-fmt -- - --outline
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use apicat_schema::{NodeId, SchemaTree};
use clap::Parser;

/// Format and check an APICat JSON Schema document
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Schema file to read; omit or pass `-` to read stdin
    path: Option<PathBuf>,

    /// Print the property tree in display order instead of JSON
    #[arg(long)]
    outline: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let input = match args.path.as_deref() {
        Some(file) if file.as_os_str() != "-" => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read schema file {}", file.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read schema from stdin")?;
            buf
        }
    };

    let tree = SchemaTree::from_json_str(&input)?;
    tracing::info!("Loaded schema tree with {} nodes", tree.len());

    if let Err(e) = tree.check_consistency() {
        tracing::warn!("Schema tree is inconsistent: {}", e);
        return Err(e.into());
    }

    if args.outline {
        print_outline(&tree, tree.root(), 0);
    } else {
        println!("{}", serde_json::to_string_pretty(&tree.to_json())?);
    }

    Ok(())
}

fn print_outline(tree: &SchemaTree, id: NodeId, indent: usize) {
    let Some(node) = tree.node(id) else {
        return;
    };

    let required = node
        .parent()
        .and_then(|parent| tree.node(parent))
        .and_then(|parent| parent.schema().as_object())
        .is_some_and(|object| object.is_required(node.name()));

    println!(
        "{:indent$}{} ({}){}",
        "",
        node.name(),
        node.schema_type(),
        if required { " *" } else { "" },
        indent = indent * 2
    );

    for child in tree.children(id) {
        print_outline(tree, child.id(), indent + 1);
    }
}
