//! Artifact and dependency-declaration model.
//!
//! Within one resolved build, an artifact is identified by its resolved
//! file path: two records with the same path are the same artifact, and
//! the snapshot loader rejects duplicate paths. Equality, ordering and
//! hashing therefore all go through the path, which also makes every
//! derived set iterate in a stable order.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One resolved binary unit: module coordinate, version, optional
/// classifier, file extension, and the resolved file it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub group: String,
    pub name: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
    /// Resolved file path — the identity of this artifact.
    pub file: PathBuf,
}

impl Artifact {
    /// File name of the resolved artifact (last path component).
    pub fn file_name(&self) -> &str {
        self.file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Whether the artifact is a packaged, jar-like unit whose contained
    /// classes can be indexed.
    pub fn is_packaged(&self) -> bool {
        self.extension == "jar"
    }

    /// The `group:name:version` coordinate, without classifier/extension.
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group, self.name, self.version)
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file
    }
}

impl Eq for Artifact {}

impl PartialOrd for Artifact {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Artifact {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.file.cmp(&other.file)
    }
}

impl std::hash::Hash for Artifact {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.file.hash(state);
    }
}

impl fmt::Display for Artifact {
    /// Renders as `group:name:version[classifier]@extension`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}@{}",
            self.coordinate(),
            self.classifier.as_deref().unwrap_or(""),
            self.extension
        )
    }
}

/// A textual first-level dependency declaration: a (name, version) hint
/// matched against artifact file names, distinct from resolved identity.
/// A dependency can be declared in one scope yet physically resolve only
/// through another module's transitive graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyDecl {
    pub name: String,
    pub version: String,
}

impl DependencyDecl {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// The artifact file name this declaration matches.
    pub fn artifact_file_name(&self) -> String {
        format!("{}-{}.jar", self.name, self.version)
    }
}

/// A named dependency scope. Each scope resolves independently to its own
/// first-level declarations and transitive artifact closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    Main,
    Test,
    PermitUnused,
    PermitUnusedTest,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Test => "test",
            Self::PermitUnused => "permit-unused",
            Self::PermitUnusedTest => "permit-unused-test",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collects the file paths of a set of artifacts.
pub fn artifact_files<'a>(
    artifacts: impl IntoIterator<Item = &'a Artifact>,
) -> std::collections::BTreeSet<PathBuf> {
    artifacts.into_iter().map(|a| a.file.clone()).collect()
}

/// File name of a path, empty when absent or non-UTF8.
pub fn path_file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}
