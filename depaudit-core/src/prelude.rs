//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use depaudit_core::prelude::*;
//! ```

// Core analysis types
pub use crate::artifact::{Artifact, DependencyDecl, Scope};
pub use crate::error::{DepauditError, DepauditResult};

// Snapshot loading
pub use crate::snapshot::BuildSnapshot;

// Classification
pub use crate::classify::{Classifier, DependencyAnalysis};
pub use crate::resolve::SnapshotResolver;

// Reporting
pub use crate::report::{render_text, ReportOptions, Verdict};

// Whole-build auditing
pub use crate::workspace::{audit_all, audit_project, ProjectAudit};

// Builder API
pub use crate::builder::{Audit, AuditOutcome};

// Configuration
pub use crate::config::{load_config, DepauditConfig};
