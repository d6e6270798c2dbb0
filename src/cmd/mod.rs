pub(crate) mod convert;
mod glob_util;
mod schema;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use erd_relational::config::ConvertYamlConfig;
use std::io;
use std::path::PathBuf;

use convert::ConvertFlags;

#[derive(Parser)]
#[command(name = "erd-relational")]
#[command(version)]
#[command(
    about = "Convert ER diagrams (.erdplus) into relational schema diagrams",
    long_about = None
)]
pub struct Cli {
    /// Verbose output (debug logging; RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert ER diagrams into relational diagrams
    Convert {
        /// Input diagram file, directory or glob pattern (e.g., *.erdplus, diagrams/**/*.erdplus)
        file: PathBuf,

        /// Output directory (default: next to each input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML config file with convert defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the converted diagram to stdout instead of writing a file
        #[arg(long, conflicts_with_all = ["output", "json", "dry_run"])]
        stdout: bool,

        /// Convert the diagram as saved, without repairing parent links and relationship ids
        #[arg(long)]
        no_repair: bool,

        /// Treat validation warnings as failures
        #[arg(long)]
        strict: bool,

        /// Write compact JSON instead of pretty-printed JSON
        #[arg(long)]
        compact: bool,

        /// Stop on first file that fails (for globs and directories)
        #[arg(long)]
        fail_fast: bool,

        /// Preview without writing files (dry run)
        #[arg(long)]
        dry_run: bool,

        /// Show a progress bar for multi-file runs
        #[arg(short, long)]
        progress: bool,

        /// Output a JSON run summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Check ER diagrams for problems the converter would skip over
    Validate {
        /// Input diagram file, directory or glob pattern
        file: PathBuf,

        /// Treat warnings as errors (exit code 1)
        #[arg(long)]
        strict: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Validate the diagram as saved, without the repair pass
        #[arg(long)]
        no_repair: bool,

        /// Stop on first file that fails (for globs and directories)
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print JSON Schemas for diagram files and --json outputs
    Schema {
        /// Schema to print: er, relational, convert, validate (default: all)
        #[arg(short, long)]
        name: Option<String>,

        /// Write one <name>.schema.json per schema into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List available schema names
        #[arg(long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Convert {
            file,
            output,
            config,
            stdout,
            no_repair,
            strict,
            compact,
            fail_fast,
            dry_run,
            progress,
            json,
        } => convert::run(
            file,
            ConvertFlags {
                output,
                config,
                stdout,
                no_repair,
                strict,
                compact,
                fail_fast,
                dry_run,
                progress,
                json,
            },
        ),
        Commands::Validate {
            file,
            strict,
            json,
            no_repair,
            fail_fast,
        } => {
            let defaults = ConvertYamlConfig::default();
            validate::run(file, defaults.extension(), strict, json, no_repair, fail_fast)
        }
        Commands::Schema { name, output, list } => schema::run(name, output, list),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "erd-relational",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
