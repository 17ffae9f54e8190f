//! # Check Subcommand
//!
//! Runs the full checker pipeline over a package tree: deterministic scan,
//! structural schema validation, convention rules, aggregated report.
//! All rules accumulate; one run surfaces everything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use packlint_core::Report;
use packlint_pack::PackageTree;
use packlint_schema::SchemaValidator;

/// Arguments for the `packlint check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Root of the package tree to check.
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Treat warnings as failures for the exit code.
    #[arg(long)]
    pub strict: bool,

    /// Report output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Report rendering formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per violation plus a summary.
    Text,
    /// The structured report as JSON.
    Json,
}

/// Execute the check subcommand.
///
/// Returns the process exit code: 0 on a clean tree, 1 on violations.
/// Operational failures (unreadable root) surface as `Err` and exit 2.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let report = lint_tree(&args.root)?;

    match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to render report")?;
            println!("{json}");
        }
    }

    Ok(report.exit_code(args.strict))
}

/// Run the full pipeline and return the aggregated report.
///
/// Violations are ordered by file path; within a file, convention rules
/// come before schema findings. Two runs over the same unchanged tree
/// produce identical reports.
pub fn lint_tree(root: &std::path::Path) -> Result<Report> {
    let tree = PackageTree::scan(root)
        .with_context(|| format!("failed to scan package tree at {}", root.display()))?;
    let validator = SchemaValidator::builtin().context("failed to load built-in schemas")?;

    tracing::info!(
        files = tree.files_checked(),
        schemas = validator.schema_count(),
        "checking package tree"
    );

    let mut report = packlint_pack::check_tree(&tree);
    for file in &tree.packages {
        report.extend(validator.check_document(&file.path, &file.doc, file.layer));
    }
    report.sort_by_file();
    Ok(report)
}

fn render_text(report: &Report) {
    for violation in &report.violations {
        println!("{violation}");
    }
    if !report.violations.is_empty() {
        println!();
    }
    println!(
        "Checked {} file(s): {} error(s), {} warning(s)",
        report.files_checked,
        report.error_count(),
        report.warning_count()
    );
}
