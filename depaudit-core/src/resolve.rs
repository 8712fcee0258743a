//! Collaborator seams consumed by the classifier.
//!
//! The classifier never touches the build system directly: everything it
//! needs arrives through the five narrow traits below, so a test can drive
//! it with fixed fixture sets and a host can back it with whatever graph
//! resolution it has. [`SnapshotResolver`] is the production
//! implementation, answering every call from one project of a loaded
//! [`BuildSnapshot`].

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::artifact::{Artifact, DependencyDecl, Scope};
use crate::error::DepauditResult;
use crate::snapshot::{BuildSnapshot, ProjectSnapshot};

/// One resolved scope: textual declarations, first-level artifacts, and
/// the full transitive artifact closure.
#[derive(Debug, Clone, Default)]
pub struct ResolvedScope {
    pub declarations: BTreeSet<DependencyDecl>,
    pub first_level: BTreeSet<Artifact>,
    pub transitive: BTreeSet<Artifact>,
}

impl ResolvedScope {
    /// Artifact file names the scope's textual declarations match.
    pub fn declaration_names(&self) -> BTreeSet<String> {
        self.declarations
            .iter()
            .map(DependencyDecl::artifact_file_name)
            .collect()
    }
}

/// Resolves a named scope to its declarations and artifact sets.
pub trait ScopeResolver {
    fn resolve_scope(&self, scope: Scope) -> DepauditResult<ResolvedScope>;
}

/// Produces the class names referenced anywhere in a set of compiled-class
/// roots.
pub trait ReferenceScanner {
    fn scan_referenced_classes(&self, roots: &[PathBuf]) -> DepauditResult<BTreeSet<String>>;
}

/// Produces the class names physically contained in a packaged artifact.
/// Only meaningful for jar-like artifacts; others yield the empty set.
pub trait ContentIndex {
    fn scan_contained_classes(&self, artifact: &Artifact) -> BTreeSet<String>;
}

/// Looks up the direct superclass and implemented interfaces of a class.
/// Lookup failure is not an error: unknown classes yield the empty set.
pub trait TypeHierarchy {
    fn lookup_supertypes(&self, class_name: &str) -> BTreeSet<String>;
}

/// Resolves the `api` (re-exported) declarations of an artifact's owning
/// project. Empty for artifacts not produced inside the same build graph.
pub trait ApiResolver {
    fn project_api_dependencies(&self, artifact: &Artifact) -> Vec<DependencyDecl>;
}

/// Umbrella bound for anything that can back a full classification run.
pub trait BuildGraph:
    ScopeResolver + ReferenceScanner + ContentIndex + TypeHierarchy + ApiResolver
{
}

impl<T> BuildGraph for T where
    T: ScopeResolver + ReferenceScanner + ContentIndex + TypeHierarchy + ApiResolver
{
}

/// Snapshot-backed implementation of all collaborator seams for one
/// project of a build graph.
#[derive(Debug, Clone)]
pub struct SnapshotResolver<'a> {
    snapshot: &'a BuildSnapshot,
    project_path: &'a str,
    project: &'a ProjectSnapshot,
}

impl<'a> SnapshotResolver<'a> {
    /// Bind a resolver to one project of the snapshot.
    pub fn new(snapshot: &'a BuildSnapshot, project_path: &'a str) -> DepauditResult<Self> {
        let project = snapshot.project(project_path)?;
        Ok(Self {
            snapshot,
            project_path,
            project,
        })
    }

    /// The project this resolver answers for.
    pub fn project_path(&self) -> &str {
        self.project_path
    }

    /// The bound project's snapshot block.
    pub fn project(&self) -> &ProjectSnapshot {
        self.project
    }

    fn artifacts(
        &self,
        scope: Scope,
        ids: &[PathBuf],
    ) -> DepauditResult<BTreeSet<Artifact>> {
        ids.iter()
            .map(|id| {
                self.snapshot
                    .artifacts
                    .get(id)
                    .map(|record| record.to_artifact(id))
                    .ok_or_else(|| {
                        crate::error::DepauditError::resolution(
                            scope.as_str(),
                            format!("artifact id {} not in snapshot", id.display()),
                        )
                    })
            })
            .collect()
    }
}

impl ScopeResolver for SnapshotResolver<'_> {
    fn resolve_scope(&self, scope: Scope) -> DepauditResult<ResolvedScope> {
        let block = self.project.scope(scope);
        Ok(ResolvedScope {
            declarations: block.declarations.iter().cloned().collect(),
            first_level: self.artifacts(scope, &block.first_level)?,
            transitive: self.artifacts(scope, &block.transitive)?,
        })
    }
}

impl ReferenceScanner for SnapshotResolver<'_> {
    fn scan_referenced_classes(&self, roots: &[PathBuf]) -> DepauditResult<BTreeSet<String>> {
        let mut referenced = BTreeSet::new();
        for root in roots {
            match self.snapshot.class_roots.get(root) {
                Some(classes) => referenced.extend(classes.iter().cloned()),
                None => {
                    // A class root with no scan entry contributes nothing;
                    // typical for source sets that compiled no classes.
                    debug!(root = %root.display(), "class root has no scan entry");
                }
            }
        }
        Ok(referenced)
    }
}

impl ContentIndex for SnapshotResolver<'_> {
    fn scan_contained_classes(&self, artifact: &Artifact) -> BTreeSet<String> {
        if !artifact.is_packaged() {
            return BTreeSet::new();
        }
        self.snapshot
            .artifacts
            .get(&artifact.file)
            .map(|record| record.classes.clone())
            .unwrap_or_default()
    }
}

impl TypeHierarchy for SnapshotResolver<'_> {
    fn lookup_supertypes(&self, class_name: &str) -> BTreeSet<String> {
        self.snapshot
            .types
            .get(class_name)
            .map(|record| record.supertype_names())
            .unwrap_or_default()
    }
}

impl ApiResolver for SnapshotResolver<'_> {
    fn project_api_dependencies(&self, artifact: &Artifact) -> Vec<DependencyDecl> {
        let Some(record) = self.snapshot.artifacts.get(&artifact.file) else {
            return Vec::new();
        };
        let Some(owner) = &record.project else {
            return Vec::new();
        };
        self.snapshot
            .projects
            .get(owner)
            .map(|p| p.api_declarations.clone())
            .unwrap_or_default()
    }
}
