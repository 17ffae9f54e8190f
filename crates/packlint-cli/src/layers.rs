//! # Layers Subcommand
//!
//! Prints the layer classification of every YAML file in a tree. Useful
//! when an include chain misbehaves: the classification drives both the
//! include-order rule and the substitution merge, so seeing it directly
//! answers most "why did that rule fire" questions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use packlint_pack::PackageTree;

/// Arguments for the `packlint layers` subcommand.
#[derive(Args, Debug)]
pub struct LayersArgs {
    /// Root of the package tree to classify.
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,
}

/// Execute the layers subcommand. Always exits 0 unless the root is
/// unreadable.
pub fn run_layers(args: &LayersArgs) -> Result<u8> {
    let tree = PackageTree::scan(&args.root)
        .with_context(|| format!("failed to scan package tree at {}", args.root.display()))?;

    for (path, layer) in &tree.listing {
        let label = layer.map_or("-", |l| l.as_str());
        println!("{label:<12} {}", path.display());
    }

    Ok(0)
}
