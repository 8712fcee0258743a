//! Builder pattern API for running an audit.
//!
//! Provides a fluent interface for configuring and running a
//! build-dependency audit:
//!
//! ```rust,ignore
//! use depaudit_core::prelude::*;
//!
//! let outcome = Audit::new("/build/graph.depsnap.json")
//!     .warn_only(true)
//!     .include_filters(["com.acme"])
//!     .run()?;
//!
//! for audit in &outcome.audits {
//!     println!("{}: {}", audit.project, audit.problem_count);
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cache::{self, AuditCache, CachedAudit};
use crate::report::ReportOptions;
use crate::snapshot::BuildSnapshot;
use crate::workspace::{audit_all, audit_project_report};

/// Builder for configuring an audit run.
#[derive(Debug, Clone)]
pub struct Audit {
    /// Snapshot file to audit.
    snapshot_path: PathBuf,

    /// Restrict the run to a single project.
    project: Option<String>,

    /// Report without failing.
    warn_only: bool,

    /// Coordinate substrings restricting what is reported.
    include_filters: Vec<String>,

    /// Whether to use the result cache.
    use_cache: bool,
}

impl Audit {
    /// Create a new audit builder for the given snapshot file.
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            project: None,
            warn_only: false,
            include_filters: Vec::new(),
            use_cache: true,
        }
    }

    /// Audit a single project instead of the whole build.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Report problems without treating them as a failure.
    pub fn warn_only(mut self, enabled: bool) -> Self {
        self.warn_only = enabled;
        self
    }

    /// Add coordinate substrings restricting which artifacts are reported.
    pub fn include_filters(
        mut self,
        filters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.include_filters
            .extend(filters.into_iter().map(Into::into));
        self
    }

    /// Enable or disable the result cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Run the audit and return per-project results.
    pub fn run(&self) -> Result<AuditOutcome> {
        // 1. Read the snapshot bytes once; they feed both the cache key
        //    and the parser.
        let bytes = fs::read(&self.snapshot_path)
            .with_context(|| format!("Failed to read snapshot {}", self.snapshot_path.display()))?;
        let input_hash = cache::input_hash(&bytes, &self.include_filters);

        let cache_dir = self
            .snapshot_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        // 2. Serve from cache when every requested project is covered.
        let mut stored = if self.use_cache {
            cache::load_cache(&cache_dir)
        } else {
            None
        };
        if let Some(cached) = stored.as_ref().and_then(|c| self.from_cache(c, &input_hash)) {
            return Ok(cached);
        }

        // 3. Parse and validate.
        let text = String::from_utf8(bytes).with_context(|| {
            format!("Snapshot {} is not UTF-8", self.snapshot_path.display())
        })?;
        let snapshot = BuildSnapshot::from_json(&self.snapshot_path, &text)?;

        // 4. Audit the requested projects.
        let options = ReportOptions::new(self.include_filters.clone());
        let audits = match &self.project {
            Some(project) => vec![audit_project_report(&snapshot, project, &options)?],
            None => audit_all(&snapshot, &options),
        };

        // 5. Record results; cache problems are never fatal.
        if self.use_cache {
            let cache = stored.get_or_insert_with(AuditCache::new);
            cache.snapshot_projects = snapshot
                .project_paths()
                .iter()
                .map(|p| p.to_string())
                .collect();
            for audit in &audits {
                cache.record(
                    &audit.project,
                    CachedAudit {
                        input_hash: input_hash.clone(),
                        report: audit.report.clone(),
                        problem_count: audit.analysis.problem_count(),
                    },
                );
            }
            if let Err(e) = cache::save_cache(&cache_dir, cache) {
                tracing::warn!(error = %e, "failed to save audit cache");
            }
        }

        let reports = audits
            .into_iter()
            .map(|audit| ProjectReport {
                project: audit.project,
                report: audit.report,
                problem_count: audit.analysis.problem_count(),
            })
            .collect();

        Ok(AuditOutcome {
            snapshot: self.snapshot_path.clone(),
            warn_only: self.warn_only,
            audits: reports,
            from_cache: false,
        })
    }

    /// Build an outcome from cache entries, when all requested projects
    /// have a current entry.
    fn from_cache(&self, cache: &AuditCache, input_hash: &str) -> Option<AuditOutcome> {
        let projects: Vec<&str> = match &self.project {
            Some(project) => vec![project.as_str()],
            None => {
                // A whole-build hit requires a current entry for every
                // project the snapshot had last time; the per-entry hash
                // check makes a stale project list harmless.
                let all: Vec<&str> = cache.snapshot_projects.iter().map(String::as_str).collect();
                if all.is_empty()
                    || !all
                        .iter()
                        .all(|p| cache.lookup(p, input_hash).is_some())
                {
                    return None;
                }
                all
            }
        };

        let mut audits = Vec::new();
        for project in projects {
            let entry = cache.lookup(project, input_hash)?;
            audits.push(ProjectReport {
                project: project.to_string(),
                report: entry.report.clone(),
                problem_count: entry.problem_count,
            });
        }
        audits.sort_by(|a, b| a.project.cmp(&b.project));

        Some(AuditOutcome {
            snapshot: self.snapshot_path.clone(),
            warn_only: self.warn_only,
            audits,
            from_cache: true,
        })
    }
}

/// One project's rendered result.
#[derive(Debug, Clone)]
pub struct ProjectReport {
    pub project: String,
    /// Rendered text report; empty when clean.
    pub report: String,
    pub problem_count: usize,
}

impl ProjectReport {
    pub fn is_clean(&self) -> bool {
        self.report.is_empty()
    }
}

/// Result of running an audit.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// Snapshot that was audited.
    pub snapshot: PathBuf,
    /// Whether problems should warn instead of fail.
    pub warn_only: bool,
    /// Per-project results, in project order.
    pub audits: Vec<ProjectReport>,
    /// Whether every result came from the cache.
    pub from_cache: bool,
}

impl AuditOutcome {
    /// Check if any project has reportable problems.
    pub fn has_problems(&self) -> bool {
        self.audits.iter().any(|a| !a.is_clean())
    }

    /// Whether this run should fail the build.
    pub fn should_fail(&self) -> bool {
        self.has_problems() && !self.warn_only
    }

    /// Combined report text across projects.
    pub fn combined_report(&self) -> String {
        let mut out = String::new();
        for audit in &self.audits {
            if audit.is_clean() {
                continue;
            }
            out.push_str(&format!("=== Project: {} ===\n", audit.project));
            out.push_str(&audit.report);
        }
        out
    }
}
