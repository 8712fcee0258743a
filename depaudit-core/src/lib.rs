//! depaudit-core: build-dependency usage classification for JVM build graphs.
//!
//! This library compares what a module *declares* it depends on with what
//! its compiled output *actually* references, and flags four kinds of
//! build-dependency rot:
//!
//! - **Used but undeclared**: classes are referenced from an artifact the
//!   module never declared (and that no `api` chain exposes to it)
//! - **Declared but unused**: a declaration nothing in the compiled
//!   output touches
//! - **Wrong scope**: a main declaration only test code uses
//! - **Stale exceptions**: a permit-unused exception on a dependency
//!   that is in fact used
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use depaudit_core::prelude::*;
//!
//! let outcome = Audit::new("/build/graph.depsnap.json")
//!     .warn_only(false)
//!     .run()?;
//!
//! if outcome.should_fail() {
//!     eprintln!("{}", outcome.combined_report());
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`artifact`]: artifact identity, declarations, scopes
//! - [`snapshot`]: build-graph snapshot model and loader
//! - [`resolve`]: collaborator seams + the snapshot-backed resolver
//! - [`closure`]: indirect-API closure over re-exported edges
//! - [`usage`]: used-class expansion and used-artifact mapping
//! - [`classify`]: the eight-set classification pipeline
//! - [`report`]: text/JSON rendering and the fail-vs-warn verdict
//! - [`workspace`]: whole-build parallel auditing
//! - [`builder`]: fluent audit API
//! - [`cache`]: audit result cache with SHA-256 change detection
//! - [`scan`]: snapshot file discovery
//! - [`config`]: depaudit.toml loading
//! - [`error`]: typed error handling

pub mod artifact;
pub mod builder;
pub mod cache;
pub mod classify;
pub mod closure;
pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod snapshot;
pub mod usage;
pub mod workspace;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DepauditError, DepauditResult, IoResultExt};

// Core data model
pub use artifact::{Artifact, DependencyDecl, Scope};

// Snapshot model
pub use snapshot::{
    ArtifactRecord, BuildSnapshot, ProjectSnapshot, ScopeSnapshot, TypeRecord, SNAPSHOT_FORMAT,
};

// Collaborator seams
pub use resolve::{
    ApiResolver, BuildGraph, ContentIndex, ReferenceScanner, ResolvedScope, ScopeResolver,
    SnapshotResolver, TypeHierarchy,
};

// Classification
pub use classify::{Classifier, DependencyAnalysis};
pub use closure::indirect_api_closure;
pub use usage::{build_artifact_class_map, expand_used_classes, used_artifact_files};

// Reporting
pub use report::{
    has_reportable_problems, render_json, render_text, verdict, Category, ReportOptions, Verdict,
};

// Whole-build auditing
pub use workspace::{audit_all, audit_project, audit_project_report, audit_tree, ProjectAudit};

// Builder API
pub use builder::{Audit, AuditOutcome, ProjectReport};

// Caching
pub use cache::{input_hash, load_cache, save_cache, AuditCache, CacheMetadata, CachedAudit};

// Configuration
pub use config::{load_config, DepauditConfig, OutputConfig};

// Logging
pub use logging::init_structured_logging;

// Snapshot discovery
pub use scan::{gather_snapshot_files, gather_snapshot_files_with_excludes, is_snapshot_file};

#[cfg(test)]
mod tests;
