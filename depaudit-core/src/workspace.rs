//! Whole-build auditing across all projects of a snapshot.
//!
//! One snapshot describes many projects; each project classifies
//! independently against immutable shared snapshot data, so the fan-out
//! runs on Rayon's thread pool. Per-project failures during a whole-build
//! audit are logged and skipped; auditing an explicitly requested project
//! propagates its failure instead.

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::warn;

use crate::classify::{Classifier, DependencyAnalysis};
use crate::error::DepauditResult;
use crate::report::{render_text, ReportOptions};
use crate::resolve::SnapshotResolver;
use crate::scan::gather_snapshot_files;
use crate::snapshot::BuildSnapshot;

/// Result of auditing a single project.
#[derive(Debug, Clone)]
pub struct ProjectAudit {
    /// Build path of the audited project.
    pub project: String,
    /// The eight classification sets.
    pub analysis: DependencyAnalysis,
    /// Rendered text report; empty when clean (after filtering).
    pub report: String,
}

impl ProjectAudit {
    /// True when the rendered report is empty.
    pub fn is_clean(&self) -> bool {
        self.report.is_empty()
    }
}

/// Classify one project of a snapshot.
pub fn audit_project(snapshot: &BuildSnapshot, project: &str) -> DepauditResult<DependencyAnalysis> {
    let resolver = SnapshotResolver::new(snapshot, project)?;
    let block = resolver.project();

    Classifier::new(
        &resolver,
        &block.main_class_roots,
        &block.test_class_roots,
        block.output_artifact.as_deref(),
    )
    .classify()
}

/// Classify one project and render its report.
pub fn audit_project_report(
    snapshot: &BuildSnapshot,
    project: &str,
    options: &ReportOptions,
) -> DepauditResult<ProjectAudit> {
    let analysis = audit_project(snapshot, project)?;
    let report = render_text(&analysis, options);
    Ok(ProjectAudit {
        project: project.to_string(),
        analysis,
        report,
    })
}

/// Audit every project of a snapshot in parallel.
///
/// A project whose scopes fail to resolve is logged and skipped; the rest
/// of the build is still audited. Results come back in project order.
pub fn audit_all(snapshot: &BuildSnapshot, options: &ReportOptions) -> Vec<ProjectAudit> {
    let mut audits: Vec<ProjectAudit> = snapshot
        .project_paths()
        .into_par_iter()
        .filter_map(
            |project| match audit_project_report(snapshot, project, options) {
                Ok(audit) => Some(audit),
                Err(e) => {
                    warn!(project, error = %e, "project audit failed; skipping");
                    None
                }
            },
        )
        .collect();

    audits.sort_by(|a, b| a.project.cmp(&b.project));
    audits
}

/// Audit every snapshot found under a directory tree.
///
/// Returns `(snapshot path, audits)` pairs in path order. A snapshot that
/// fails to load is logged and skipped.
pub fn audit_tree(
    root: &Path,
    options: &ReportOptions,
) -> Result<Vec<(std::path::PathBuf, Vec<ProjectAudit>)>> {
    let files = gather_snapshot_files(root)
        .with_context(|| format!("Failed to scan {} for snapshots", root.display()))?;

    let mut results = Vec::new();
    for file in files {
        match BuildSnapshot::load(&file) {
            Ok(snapshot) => {
                let audits = audit_all(&snapshot, options);
                results.push((file, audits));
            }
            Err(e) => {
                warn!(snapshot = %file.display(), error = %e, "snapshot failed to load; skipping");
            }
        }
    }

    Ok(results)
}
