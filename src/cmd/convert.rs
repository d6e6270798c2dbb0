//! Convert command CLI handler.

use erd_relational::config::ConvertYamlConfig;
use erd_relational::io::{output_path_for, read_diagram, to_json_string, write_diagram};
use erd_relational::model::Diagram;
use erd_relational::repair;
use erd_relational::transform::{transform_er_with_stats, TransformOptions, TransformStats};
use erd_relational::validate::{validate_er, Severity, ValidationSummary};
use indicatif::{ProgressBar, ProgressStyle};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::glob_util::{expand_file_pattern, MultiFileResult};

/// Command-line flags of `convert`; `None`/`false` defers to the config file
#[derive(Debug, Clone, Default)]
pub struct ConvertFlags {
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub stdout: bool,
    pub no_repair: bool,
    pub strict: bool,
    pub compact: bool,
    pub fail_fast: bool,
    pub dry_run: bool,
    pub progress: bool,
    pub json: bool,
}

/// Effective settings after merging the config file with the flags
#[derive(Debug, Clone)]
struct ConvertSettings {
    extension: String,
    output_suffix: String,
    output_dir: Option<PathBuf>,
    pretty: bool,
    repair: bool,
    strict: bool,
    fail_fast: bool,
    dry_run: bool,
    to_stdout: bool,
    progress: bool,
    json: bool,
}

impl ConvertSettings {
    fn resolve(flags: ConvertFlags) -> anyhow::Result<Self> {
        let config = match &flags.config {
            Some(path) => ConvertYamlConfig::load(path)?,
            None => ConvertYamlConfig::default(),
        };
        Ok(Self {
            extension: config.extension().to_string(),
            output_suffix: config.output_suffix.clone(),
            output_dir: flags.output,
            pretty: config.pretty && !flags.compact,
            repair: !(config.skip_repair || flags.no_repair),
            strict: config.strict || flags.strict,
            fail_fast: config.fail_fast || flags.fail_fast,
            dry_run: flags.dry_run,
            to_stdout: flags.stdout,
            progress: flags.progress,
            json: flags.json,
        })
    }
}

/// Outcome for one converted file
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FileJsonOutput {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// "converted", "unchanged" (already relational) or "failed"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: usize,
    pub stats: TransformStats,
}

/// JSON output of `convert --json`
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ConvertJsonOutput {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dry_run: bool,
    pub totals: TransformStats,
    pub files: Vec<FileJsonOutput>,
}

struct FileOutcome {
    output: Option<PathBuf>,
    unchanged: bool,
    warnings: usize,
    stats: TransformStats,
}

pub fn run(file: PathBuf, flags: ConvertFlags) -> anyhow::Result<()> {
    let settings = ConvertSettings::resolve(flags)?;
    let expanded = expand_file_pattern(&file, &settings.extension)?;

    if settings.to_stdout && expanded.files.len() > 1 {
        anyhow::bail!("--stdout accepts a single input file, got {}", expanded.files.len());
    }

    let total = expanded.files.len();
    let mut result = MultiFileResult::new();
    result.total_files = total;
    let mut reports = Vec::with_capacity(total);
    let mut totals = TransformStats::default();
    let quiet = settings.json || settings.to_stdout;
    let multi = expanded.pattern_was_glob;

    if multi && !quiet {
        eprintln!("Converting {} files...\n", total);
    }

    let pb = if settings.progress && multi && !quiet {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap()
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        Some(pb)
    } else {
        None
    };

    for (idx, path) in expanded.files.iter().enumerate() {
        if multi && !quiet && pb.is_none() {
            eprintln!("[{}/{}] Converting: {}", idx + 1, total, path.display());
        }
        if let Some(ref pb) = pb {
            pb.set_message(path.display().to_string());
        }

        let outcome = convert_file(path, &settings);
        if let Some(ref pb) = pb {
            pb.inc(1);
        }

        match outcome {
            Ok(done) => {
                if !quiet && pb.is_none() {
                    print_outcome(&done, settings.dry_run);
                }
                totals.merge(&done.stats);
                reports.push(FileJsonOutput {
                    input: path.display().to_string(),
                    output: done.output.as_ref().map(|p| p.display().to_string()),
                    status: if done.unchanged { "unchanged" } else { "converted" }.to_string(),
                    error: None,
                    warnings: done.warnings,
                    stats: done.stats,
                });
                result.record_success();
            }
            Err(e) => {
                if !settings.json {
                    eprintln!("  Error: {:#}\n", e);
                }
                reports.push(FileJsonOutput {
                    input: path.display().to_string(),
                    output: None,
                    status: "failed".to_string(),
                    error: Some(format!("{:#}", e)),
                    warnings: 0,
                    stats: TransformStats::default(),
                });
                result.record_failure(path.clone(), format!("{:#}", e));
                if settings.fail_fast {
                    break;
                }
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    if settings.json {
        let output = ConvertJsonOutput {
            total_files: total,
            succeeded: result.succeeded,
            failed: result.failed,
            dry_run: settings.dry_run,
            totals,
            files: reports,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if multi && !settings.to_stdout {
        print_summary(&result, &totals);
    }

    if result.has_failures() {
        if !multi {
            let (path, error) = &result.errors[0];
            anyhow::bail!("{}: {}", path.display(), error);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn convert_file(path: &Path, settings: &ConvertSettings) -> anyhow::Result<FileOutcome> {
    let diagram = read_diagram(path)?;

    let (converted, stats, warnings, unchanged) = match diagram {
        Diagram::Relational(relational) => {
            log::debug!("{} is already relational", path.display());
            (Diagram::Relational(relational), TransformStats::default(), 0, true)
        }
        Diagram::Er(mut er) => {
            if settings.repair {
                let report = repair::repair(&mut er);
                log::debug!(
                    "{}: {} attribute(s) re-parented, {} relationship(s) reconciled",
                    path.display(),
                    report.attributes_reparented,
                    report.relationships_reconciled
                );
            }

            let summary = ValidationSummary::new(
                &er.name,
                validate_er(&er),
                er.data.nodes.len(),
                er.data.edges.len(),
            );
            for issue in summary.issues.iter().filter(|i| i.severity != Severity::Info) {
                log::warn!("{}: {}", path.display(), issue);
            }
            if summary.is_failure(settings.strict) {
                let first = summary
                    .issues
                    .iter()
                    .find(|i| {
                        i.severity == Severity::Error
                            || (settings.strict && i.severity == Severity::Warning)
                    })
                    .map(|i| i.to_string())
                    .unwrap_or_default();
                anyhow::bail!(
                    "validation failed ({} errors, {} warnings): {}",
                    summary.summary.errors,
                    summary.summary.warnings,
                    first
                );
            }

            let (relational, stats) = transform_er_with_stats(&er, &TransformOptions::default());
            (
                Diagram::Relational(relational),
                stats,
                summary.summary.warnings,
                false,
            )
        }
    };

    if settings.to_stdout {
        println!("{}", to_json_string(&converted, settings.pretty)?);
        return Ok(FileOutcome {
            output: None,
            unchanged,
            warnings,
            stats,
        });
    }

    let output = output_path_for(path, settings.output_dir.as_deref(), &settings.output_suffix);
    if !settings.dry_run {
        write_diagram(&output, &converted, settings.pretty)?;
    }

    Ok(FileOutcome {
        output: Some(output),
        unchanged,
        warnings,
        stats,
    })
}

fn print_outcome(outcome: &FileOutcome, dry_run: bool) {
    let warning_str = if outcome.warnings == 0 {
        String::new()
    } else {
        format!(" ({} warnings)", outcome.warnings)
    };

    if outcome.unchanged {
        eprintln!("  already relational, copied unchanged{}", warning_str);
    } else {
        eprintln!(
            "  {} tables, {} edges, {} columns{}",
            outcome.stats.tables, outcome.stats.edges, outcome.stats.columns, warning_str
        );
    }

    if let Some(ref out) = outcome.output {
        if dry_run {
            eprintln!("  → {} (dry run, not written)", out.display());
        } else {
            eprintln!("  → {}", out.display());
        }
    }
    eprintln!();
}

fn print_summary(result: &MultiFileResult, totals: &TransformStats) {
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("Conversion Summary:");
    eprintln!("  Total files: {}", result.total_files);
    eprintln!("  Succeeded: {}", result.succeeded);
    eprintln!("  Failed: {}", result.failed);
    eprintln!(
        "  Tables: {} ({} associative, {} satellite)",
        totals.tables, totals.associative_tables, totals.satellite_tables
    );
    eprintln!(
        "  Skipped: {} relationships, {} attributes",
        totals.skipped_relationships, totals.skipped_attributes
    );

    if result.has_failures() {
        eprintln!();
        eprintln!("Failed files:");
        for (path, error) in &result.errors {
            eprintln!("  - {}: {}", path.display(), error);
        }
    }
}
