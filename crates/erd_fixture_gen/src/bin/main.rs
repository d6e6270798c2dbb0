//! CLI for generating ER diagram fixtures.
//!
//! Usage:
//!   gen-erd-fixtures --scale medium --seed 42 > fixtures/medium.erdplus
//!   gen-erd-fixtures --scale small --count 5 --output tests/fixtures/generated

use anyhow::Context;
use clap::Parser;
use erd_fixture_gen::{Generator, Scale};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gen-erd-fixtures")]
#[command(about = "Generate ER diagram fixtures for erd-relational", long_about = None)]
struct Args {
    /// Scale preset: small, medium, large
    #[arg(short, long, default_value = "small")]
    scale: String,

    /// Random seed for reproducibility
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Number of diagrams (seeds seed, seed+1, ...)
    #[arg(short, long, default_value = "1")]
    count: u64,

    /// Output directory (default: stdout, single diagram only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let scale: Scale = args.scale.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let Some(dir) = args.output.as_ref() else {
        if args.count != 1 {
            anyhow::bail!("--count greater than 1 requires --output");
        }
        let diagram = Generator::new(args.seed, scale).generate();
        println!("{}", render(&diagram, args.compact)?);
        return Ok(());
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create directory: {}", dir.display()))?;
    for offset in 0..args.count {
        let seed = args.seed.wrapping_add(offset);
        let diagram = Generator::new(seed, scale).generate();
        let path = dir.join(format!("{:?}-{}.erdplus", scale, seed).to_lowercase());
        fs::write(&path, render(&diagram, args.compact)?)
            .with_context(|| format!("Cannot write file: {}", path.display()))?;
        eprintln!("Generated {}", path.display());
    }
    Ok(())
}

fn render(diagram: &serde_json::Value, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(diagram)
    } else {
        serde_json::to_string_pretty(diagram)
    }
}
