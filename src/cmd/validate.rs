//! Validate command CLI handler.

use erd_relational::io::read_diagram;
use erd_relational::model::Diagram;
use erd_relational::repair;
use erd_relational::validate::{validate_diagram, ValidationSummary};
use std::path::{Path, PathBuf};

use super::glob_util::{expand_file_pattern, MultiFileResult};

pub fn run(
    file: PathBuf,
    extension: &str,
    strict: bool,
    json: bool,
    no_repair: bool,
    fail_fast: bool,
) -> anyhow::Result<()> {
    let expanded = expand_file_pattern(&file, extension)?;
    let total = expanded.files.len();
    let mut result = MultiFileResult::new();
    result.total_files = total;
    let mut summaries = Vec::with_capacity(total);

    for (idx, path) in expanded.files.iter().enumerate() {
        if !json {
            if expanded.pattern_was_glob {
                eprintln!("[{}/{}] Validating: {}", idx + 1, total, path.display());
            } else {
                eprintln!("Validating diagram: {}", path.display());
            }
            eprintln!();
        }

        match validate_file(path, no_repair) {
            Ok(summary) => {
                if !json {
                    print_summary(&summary, strict);
                }
                if summary.is_failure(strict) {
                    result.record_failure(
                        path.clone(),
                        format!(
                            "{} errors, {} warnings",
                            summary.summary.errors, summary.summary.warnings
                        ),
                    );
                } else {
                    result.record_success();
                }
                summaries.push(summary);
            }
            Err(e) => {
                if !json {
                    eprintln!("  Error: {:#}\n", e);
                }
                result.record_failure(path.clone(), format!("{:#}", e));
            }
        }

        if fail_fast && result.has_failures() {
            break;
        }
    }

    if json {
        if expanded.pattern_was_glob {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        } else if let Some(summary) = summaries.first() {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    } else if expanded.pattern_was_glob {
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        eprintln!("Validation Summary:");
        eprintln!("  Total files: {}", total);
        eprintln!("  Passed: {}", result.succeeded);
        eprintln!("  Failed: {}", result.failed);
        if result.has_failures() {
            eprintln!();
            eprintln!("Failed files:");
            for (path, error) in &result.errors {
                eprintln!("  - {}: {}", path.display(), error);
            }
        }
    }

    if result.has_failures() {
        if !expanded.pattern_was_glob && summaries.is_empty() {
            let (path, error) = &result.errors[0];
            anyhow::bail!("{}: {}", path.display(), error);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn validate_file(path: &Path, no_repair: bool) -> anyhow::Result<ValidationSummary> {
    let mut diagram = read_diagram(path)?;
    if !no_repair {
        if let Diagram::Er(ref mut er) = diagram {
            repair::repair(er);
        }
    }
    Ok(validate_diagram(&diagram))
}

fn print_summary(summary: &ValidationSummary, strict: bool) {
    for issue in &summary.issues {
        eprintln!("{}", issue);
    }
    if !summary.issues.is_empty() {
        eprintln!();
    }

    eprintln!("Validation summary:");
    eprintln!("  Diagram: {}", summary.diagram);
    eprintln!(
        "  Nodes: {}, edges: {}",
        summary.summary.nodes, summary.summary.edges
    );
    eprintln!(
        "  Total: {} errors, {} warnings, {} info",
        summary.summary.errors, summary.summary.warnings, summary.summary.info
    );
    eprintln!();

    if summary.has_errors() {
        eprintln!("Result: FAILED");
    } else if summary.has_warnings() && strict {
        eprintln!("Result: FAILED (--strict mode, warnings treated as errors)");
    } else if summary.has_warnings() {
        eprintln!("Result: PASSED (with warnings)");
    } else {
        eprintln!("Result: PASSED");
    }
    eprintln!();
}
