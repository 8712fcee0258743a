//! Build-graph snapshot model and loader.
//!
//! A snapshot is a JSON export of one resolved build: every project with
//! its per-scope declarations and resolved artifact ids, the artifact
//! table (coordinate, owning project, contained classes), per-class-root
//! referenced-class lists, and the direct supertype table. The snapshot is
//! the single input of an audit; nothing else is read from the build.
//!
//! Artifact ids are resolved file paths and must be unique — the loader
//! rejects a snapshot that maps one path to two records or references an
//! id missing from the artifact table.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, DependencyDecl, Scope};
use crate::error::{DepauditError, DepauditResult};

/// Snapshot format version this build of depaudit understands.
pub const SNAPSHOT_FORMAT: u32 = 1;

fn default_format() -> u32 {
    SNAPSHOT_FORMAT
}

/// One resolved build graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSnapshot {
    /// Snapshot format version, checked on load.
    #[serde(default = "default_format")]
    pub format: u32,

    /// Projects by build path (e.g. `:app`, `:lib:core`).
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectSnapshot>,

    /// Artifact records keyed by resolved file path.
    #[serde(default)]
    pub artifacts: BTreeMap<PathBuf, ArtifactRecord>,

    /// Referenced-class scan results per compiled-class root.
    #[serde(default)]
    pub class_roots: BTreeMap<PathBuf, BTreeSet<String>>,

    /// Direct supertype table: class name to superclass/interfaces.
    #[serde(default)]
    pub types: BTreeMap<String, TypeRecord>,
}

impl Default for BuildSnapshot {
    fn default() -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            projects: BTreeMap::new(),
            artifacts: BTreeMap::new(),
            class_roots: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }
}

/// One project of the build graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// File name of this project's packaged output, when it produces one.
    #[serde(default)]
    pub output_artifact: Option<String>,

    /// Declarations in this project's `api` (re-exported) configuration.
    #[serde(default)]
    pub api_declarations: Vec<DependencyDecl>,

    /// Compiled-class roots of the main output.
    #[serde(default)]
    pub main_class_roots: Vec<PathBuf>,

    /// Compiled-class roots of the test output.
    #[serde(default)]
    pub test_class_roots: Vec<PathBuf>,

    #[serde(default)]
    pub main: ScopeSnapshot,
    #[serde(default)]
    pub test: ScopeSnapshot,
    #[serde(default)]
    pub permit_unused: ScopeSnapshot,
    #[serde(default)]
    pub permit_unused_test: ScopeSnapshot,
}

impl ProjectSnapshot {
    /// The resolved block for one scope.
    pub fn scope(&self, scope: Scope) -> &ScopeSnapshot {
        match scope {
            Scope::Main => &self.main,
            Scope::Test => &self.test,
            Scope::PermitUnused => &self.permit_unused,
            Scope::PermitUnusedTest => &self.permit_unused_test,
        }
    }
}

/// One scope of one project: textual declarations plus resolved first-level
/// and transitive artifact ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    #[serde(default)]
    pub declarations: Vec<DependencyDecl>,
    #[serde(default)]
    pub first_level: Vec<PathBuf>,
    #[serde(default)]
    pub transitive: Vec<PathBuf>,
}

/// Artifact table entry. The key in [`BuildSnapshot::artifacts`] is the
/// resolved file path; the record carries everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Build path of the owning project when this artifact is produced by
    /// a project inside the same graph. Only such artifacts participate in
    /// api-closure recursion.
    #[serde(default)]
    pub project: Option<String>,

    /// Class names physically contained in the packaged artifact.
    #[serde(default)]
    pub classes: BTreeSet<String>,
}

fn default_extension() -> String {
    "jar".to_string()
}

impl Default for ArtifactRecord {
    fn default() -> Self {
        Self {
            group: String::new(),
            name: String::new(),
            version: String::new(),
            classifier: None,
            extension: default_extension(),
            project: None,
            classes: BTreeSet::new(),
        }
    }
}

impl ArtifactRecord {
    /// Materialize the [`Artifact`] for this record at the given path.
    pub fn to_artifact(&self, file: &Path) -> Artifact {
        Artifact {
            group: self.group.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            classifier: self.classifier.clone(),
            extension: self.extension.clone(),
            file: file.to_path_buf(),
        }
    }
}

/// Direct supertype entry for one class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeRecord {
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl TypeRecord {
    /// Superclass plus interfaces as one name set.
    pub fn supertype_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.interfaces.iter().cloned().collect();
        if let Some(superclass) = &self.superclass {
            names.insert(superclass.clone());
        }
        names
    }
}

impl BuildSnapshot {
    /// Parse a snapshot from JSON text and validate it.
    pub fn from_json(path: &Path, text: &str) -> DepauditResult<Self> {
        let snapshot: BuildSnapshot = serde_json::from_str(text)
            .map_err(|e| DepauditError::snapshot(path, format!("invalid JSON: {e}")))?;
        snapshot.validate(path)?;
        Ok(snapshot)
    }

    /// Load a snapshot file from disk.
    pub fn load(path: &Path) -> DepauditResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| DepauditError::io(path, e))?;
        Self::from_json(path, &text)
    }

    /// Validate cross-references: format version, scope artifact ids, and
    /// owning-project links must all resolve.
    pub fn validate(&self, path: &Path) -> DepauditResult<()> {
        if self.format != SNAPSHOT_FORMAT {
            return Err(DepauditError::snapshot(
                path,
                format!(
                    "unsupported snapshot format {} (expected {})",
                    self.format, SNAPSHOT_FORMAT
                ),
            ));
        }

        for (project_path, project) in &self.projects {
            for scope in [
                Scope::Main,
                Scope::Test,
                Scope::PermitUnused,
                Scope::PermitUnusedTest,
            ] {
                let block = project.scope(scope);
                for id in block.first_level.iter().chain(block.transitive.iter()) {
                    if !self.artifacts.contains_key(id) {
                        return Err(DepauditError::snapshot(
                            path,
                            format!(
                                "project {project_path} scope {scope} references unknown artifact {}",
                                id.display()
                            ),
                        ));
                    }
                }
            }
        }

        for (id, record) in &self.artifacts {
            if let Some(owner) = &record.project {
                if !self.projects.contains_key(owner) {
                    return Err(DepauditError::snapshot(
                        path,
                        format!(
                            "artifact {} names unknown owning project {owner}",
                            id.display()
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Look up a project, or fail with [`DepauditError::UnknownProject`].
    pub fn project(&self, project: &str) -> DepauditResult<&ProjectSnapshot> {
        self.projects
            .get(project)
            .ok_or_else(|| DepauditError::unknown_project(project))
    }

    /// Project paths in deterministic order.
    pub fn project_paths(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }
}
