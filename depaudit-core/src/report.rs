//! Report rendering — plaintext and JSON — and the fail-vs-warn verdict.
//!
//! Categories render in a fixed order. Each non-empty category emits a
//! label line followed by one ` - group:name:version[classifier]@extension`
//! line per artifact, sorted by artifact identity. Package filters
//! restrict reporting to artifacts whose coordinate contains one of the
//! configured substrings; an empty filter list reports everything.

use std::collections::BTreeSet;

use serde_json::json;

use crate::artifact::Artifact;
use crate::classify::DependencyAnalysis;

/// The eight problem categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    MainUsedUndeclared,
    TestUsedUndeclared,
    MainUnusedDeclaredButUsedByTest,
    MainUnusedDeclared,
    TestUnusedDeclared,
    TestUnnecessaryDeclarations,
    MainUnnecessaryPermitUnused,
    TestUnnecessaryPermitUnused,
}

impl Category {
    /// All categories in the order they are reported.
    pub const ALL: [Category; 8] = [
        Category::MainUsedUndeclared,
        Category::TestUsedUndeclared,
        Category::MainUnusedDeclaredButUsedByTest,
        Category::MainUnusedDeclared,
        Category::TestUnusedDeclared,
        Category::TestUnnecessaryDeclarations,
        Category::MainUnnecessaryPermitUnused,
        Category::TestUnnecessaryPermitUnused,
    ];

    /// Human-readable label, including the remediation hint.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MainUsedUndeclared => "Main dependencies used but not declared",
            Self::TestUsedUndeclared => "Test dependencies used but not declared",
            Self::MainUnusedDeclaredButUsedByTest => {
                "Main dependencies not used by main but used by test \
                 -- move the declaration to the test scope"
            }
            Self::MainUnusedDeclared => {
                "Main dependencies declared but not used -- remove the declaration"
            }
            Self::TestUnusedDeclared => {
                "Test dependencies declared but not used -- remove the declaration"
            }
            Self::TestUnnecessaryDeclarations => {
                "Test dependencies already declared and used by main \
                 -- remove the test declaration"
            }
            Self::MainUnnecessaryPermitUnused => {
                "Main dependency is marked permit-unused but is used \
                 -- remove the permit-unused exception"
            }
            Self::TestUnnecessaryPermitUnused => {
                "Test dependency is marked permit-unused but is used \
                 -- remove the permit-unused exception"
            }
        }
    }

    /// Stable key used in JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Self::MainUsedUndeclared => "main_used_undeclared",
            Self::TestUsedUndeclared => "test_used_undeclared",
            Self::MainUnusedDeclaredButUsedByTest => "main_unused_declared_but_used_by_test",
            Self::MainUnusedDeclared => "main_unused_declared",
            Self::TestUnusedDeclared => "test_unused_declared",
            Self::TestUnnecessaryDeclarations => "test_unnecessary_declarations",
            Self::MainUnnecessaryPermitUnused => "main_unnecessary_permit_unused",
            Self::TestUnnecessaryPermitUnused => "test_unnecessary_permit_unused",
        }
    }

    /// The analysis set backing this category.
    pub fn artifacts<'a>(&self, analysis: &'a DependencyAnalysis) -> &'a BTreeSet<Artifact> {
        match self {
            Self::MainUsedUndeclared => &analysis.main_used_undeclared,
            Self::TestUsedUndeclared => &analysis.test_used_undeclared,
            Self::MainUnusedDeclaredButUsedByTest => {
                &analysis.main_unused_declared_but_used_by_test
            }
            Self::MainUnusedDeclared => &analysis.main_unused_declared,
            Self::TestUnusedDeclared => &analysis.test_unused_declared,
            Self::TestUnnecessaryDeclarations => &analysis.test_unnecessary_declarations,
            Self::MainUnnecessaryPermitUnused => &analysis.main_unnecessary_permit_unused,
            Self::TestUnnecessaryPermitUnused => &analysis.test_unnecessary_permit_unused,
        }
    }
}

/// Report-shaping options.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Substrings matched against `group:name:version`; empty reports all.
    pub include_filters: Vec<String>,
}

impl ReportOptions {
    pub fn new(include_filters: Vec<String>) -> Self {
        Self { include_filters }
    }

    fn matches(&self, artifact: &Artifact) -> bool {
        if self.include_filters.is_empty() {
            return true;
        }
        let coordinate = artifact.coordinate();
        self.include_filters.iter().any(|f| coordinate.contains(f))
    }

    fn filtered<'a>(
        &'a self,
        artifacts: &'a BTreeSet<Artifact>,
    ) -> impl Iterator<Item = &'a Artifact> + 'a {
        artifacts.iter().filter(move |a| self.matches(a))
    }
}

/// Renders the problem sets as text. Returns the empty string when nothing
/// survives filtering — the "clean" report.
pub fn render_text(analysis: &DependencyAnalysis, options: &ReportOptions) -> String {
    let mut out = String::new();

    for category in Category::ALL {
        let flagged: Vec<&Artifact> = options.filtered(category.artifacts(analysis)).collect();
        if flagged.is_empty() {
            continue;
        }

        out.push_str(category.label());
        out.push_str(": \n");
        for artifact in flagged {
            out.push_str(&format!(" - {artifact}\n"));
        }
    }

    out
}

/// Renders the problem sets as a JSON object keyed by category.
pub fn render_json(analysis: &DependencyAnalysis, options: &ReportOptions) -> serde_json::Value {
    let mut problems = serde_json::Map::new();
    for category in Category::ALL {
        let flagged: Vec<String> = options
            .filtered(category.artifacts(analysis))
            .map(|a| a.to_string())
            .collect();
        if !flagged.is_empty() {
            problems.insert(category.key().to_string(), json!(flagged));
        }
    }

    json!({
        "clean": problems.is_empty(),
        "problems": problems,
    })
}

/// Whether any category survives filtering.
pub fn has_reportable_problems(analysis: &DependencyAnalysis, options: &ReportOptions) -> bool {
    Category::ALL
        .iter()
        .any(|c| options.filtered(c.artifacts(analysis)).next().is_some())
}

/// Outcome of applying host policy to an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing to report.
    Clean,
    /// Problems found; report and keep going.
    Warn,
    /// Problems found; the run should fail.
    Fail,
}

/// Applies the warn-only policy to an analysis.
pub fn verdict(analysis: &DependencyAnalysis, options: &ReportOptions, warn_only: bool) -> Verdict {
    if !has_reportable_problems(analysis, options) {
        Verdict::Clean
    } else if warn_only {
        Verdict::Warn
    } else {
        Verdict::Fail
    }
}
