//! depaudit CLI - build-dependency usage auditor for JVM build graphs.
//!
//! Features:
//! - Audits one snapshot file or every snapshot under a directory tree
//! - Whole-build parallel auditing with per-project fault tolerance
//! - Result caching keyed on snapshot content
//! - Plain-text and JSON reports
//! - Fail-or-warn policy via flag or depaudit.toml

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use depaudit_core::{
    audit_tree, gather_snapshot_files, init_structured_logging, load_config, render_json,
    Audit, BuildSnapshot, ReportOptions, SnapshotResolver,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build-dependency usage auditor for JVM build graphs")]
pub struct Cli {
    /// Snapshot file, or a directory to scan for *.depsnap.json files
    #[arg(default_value = ".")]
    path: String,

    /// Audit a single project (e.g. ":app") instead of the whole build
    #[arg(long)]
    project: Option<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Report problems without failing
    #[arg(long)]
    warn_only: bool,

    /// Coordinate substrings restricting which artifacts are reported
    #[arg(long, num_args = 1..)]
    filter: Vec<String>,

    /// Write the report to a file as well as stdout
    #[arg(long)]
    out: Option<String>,

    /// Skip the audit result cache
    #[arg(long)]
    no_cache: bool,
}

/// Validates output file paths: relative, no traversal, no null bytes.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    for component in p.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(anyhow!(
                "Path traversal (..) not allowed in output paths: {}",
                path
            ));
        }
    }

    Ok(p)
}

/// Merge depaudit.toml (next to the snapshot or scanned root) into the
/// CLI arguments. CLI flags win; config load failure is a warning.
fn apply_config(dir: &Path, warn_only: &mut bool, filters: &mut Vec<String>, json: &mut bool) {
    match load_config(dir) {
        Ok(Some(cfg)) => {
            if let Some(value) = cfg.warn_only {
                *warn_only = *warn_only || value;
            }
            if let Some(list) = cfg.include_filters {
                filters.extend(list);
            }
            if let Some(output) = cfg.output {
                if output.format.as_deref() == Some("json") {
                    *json = true;
                }
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("[WARN] config load failed: {}", e);
        }
    }
}

/// Audit one snapshot file and print its report.
fn run_single(cli: &Cli, snapshot_path: &Path) -> Result<i32> {
    let mut warn_only = cli.warn_only;
    let mut filters = cli.filter.clone();
    let mut json = cli.json;
    let config_dir = snapshot_path.parent().unwrap_or(Path::new("."));
    apply_config(config_dir, &mut warn_only, &mut filters, &mut json);

    let mut audit = Audit::new(snapshot_path)
        .warn_only(warn_only)
        .include_filters(filters.iter().cloned())
        .with_cache(!cli.no_cache);
    if let Some(project) = &cli.project {
        audit = audit.project(project.clone());
    }

    let outcome = audit.run()?;

    let report = if json {
        // JSON mode re-runs the classification per project; the cache only
        // stores rendered text.
        let snapshot = BuildSnapshot::load(snapshot_path)?;
        let options = ReportOptions::new(filters.clone());
        let mut per_project = Vec::new();
        for audit in &outcome.audits {
            let resolver = SnapshotResolver::new(&snapshot, &audit.project)?;
            let block = resolver.project();
            let analysis = depaudit_core::Classifier::new(
                &resolver,
                &block.main_class_roots,
                &block.test_class_roots,
                block.output_artifact.as_deref(),
            )
            .classify()?;
            let mut value = render_json(&analysis, &options);
            value["project"] = serde_json::json!(audit.project);
            per_project.push(value);
        }
        serde_json::to_string_pretty(&serde_json::json!({
            "snapshot": snapshot_path.display().to_string(),
            "projects": per_project,
        }))?
    } else {
        outcome.combined_report()
    };

    if !report.is_empty() {
        println!("{}", report);
    } else if !json {
        println!("No dependency problems found.");
    }

    if let Some(out) = &cli.out {
        let safe_path = validate_output_path(out)
            .with_context(|| format!("Invalid output path: {}", out))?;
        fs::write(&safe_path, &report)
            .with_context(|| format!("Failed to write report to {}", safe_path.display()))?;
        eprintln!("[depaudit] Report written to {}", safe_path.display());
    }

    if outcome.has_problems() {
        if outcome.warn_only {
            eprintln!("[WARN] Dependency analysis found issues.");
            Ok(0)
        } else {
            eprintln!("[ERROR] Dependency analysis found issues.");
            Ok(1)
        }
    } else {
        Ok(0)
    }
}

/// Audit every snapshot under a directory tree.
fn run_tree(cli: &Cli, root: &Path) -> Result<i32> {
    let mut warn_only = cli.warn_only;
    let mut filters = cli.filter.clone();
    let mut json = cli.json;
    apply_config(root, &mut warn_only, &mut filters, &mut json);

    let snapshots = gather_snapshot_files(root)?;
    if snapshots.is_empty() {
        eprintln!("No snapshot files found under {}", root.display());
        return Ok(0);
    }
    eprintln!(
        "INFO: Auditing {} snapshot(s) under {}",
        snapshots.len(),
        root.display()
    );

    let options = ReportOptions::new(filters);
    let results = audit_tree(root, &options)?;

    let mut has_problems = false;
    for (snapshot_path, audits) in &results {
        for audit in audits {
            if audit.is_clean() {
                continue;
            }
            has_problems = true;
            println!(
                "=== {} {} ===",
                snapshot_path.display(),
                audit.project
            );
            println!("{}", audit.report);
        }
    }

    if !has_problems {
        println!("No dependency problems found.");
        return Ok(0);
    }

    if warn_only {
        eprintln!("[WARN] Dependency analysis found issues.");
        Ok(0)
    } else {
        eprintln!("[ERROR] Dependency analysis found issues.");
        Ok(1)
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let path = Path::new(&cli.path);
    if path.is_file() {
        run_single(cli, path)
    } else if path.is_dir() {
        if cli.project.is_some() {
            return Err(anyhow!(
                "--project requires a single snapshot file, not a directory"
            ));
        }
        run_tree(cli, path)
    } else {
        Err(anyhow!("Path does not exist: {}", cli.path))
    }
}

fn main() {
    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    // Exit codes: 0 clean (or warn-only), 1 problems found, 2 internal error.
    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("[ERROR] {e:#}");
            std::process::exit(2);
        }
    }
}
