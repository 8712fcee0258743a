//! Dependency usage classification — the core pipeline.
//!
//! For one module, the classifier combines the resolved scope data, the
//! indirect-API closure, and the used-class expansion into eight problem
//! sets. All set algebra runs over artifact file paths (artifact identity)
//! and is mapped back to full [`Artifact`] values at the end.
//!
//! The subtraction order is load-bearing and deliberately not commutative:
//! membership in an earlier set removes an artifact from consideration for
//! the later sets of the same scope, so no artifact is reported twice for
//! one module. Each named step below is one row of that pipeline; each is
//! traced at debug level.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::artifact::{artifact_files, path_file_name, Artifact, Scope};
use crate::closure::indirect_api_closure;
use crate::error::DepauditResult;
use crate::resolve::BuildGraph;
use crate::usage::{build_artifact_class_map, expand_used_classes, used_artifact_files};

/// The eight classification sets for one module.
///
/// Within one scope the "unused" categories are disjoint by construction;
/// an artifact that is declared and used appears in none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyAnalysis {
    /// Used by main code but not declared (and not api-exposed).
    pub main_used_undeclared: BTreeSet<Artifact>,
    /// Used by test code but not declared; excludes artifacts already
    /// declared-and-used by main and this module's own packaged output.
    pub test_used_undeclared: BTreeSet<Artifact>,
    /// Declared in main, unused by main, but used by test — the
    /// declaration belongs in the test scope.
    pub main_unused_declared_but_used_by_test: BTreeSet<Artifact>,
    /// Declared in main and used nowhere.
    pub main_unused_declared: BTreeSet<Artifact>,
    /// Declared in test and used nowhere.
    pub test_unused_declared: BTreeSet<Artifact>,
    /// Declared in test while main already declares and uses it.
    pub test_unnecessary_declarations: BTreeSet<Artifact>,
    /// Permit-unused exception on a main dependency that is in fact used.
    pub main_unnecessary_permit_unused: BTreeSet<Artifact>,
    /// Permit-unused exception on a test dependency that is in fact used.
    pub test_unnecessary_permit_unused: BTreeSet<Artifact>,
}

impl DependencyAnalysis {
    /// True when every problem set is empty.
    pub fn is_clean(&self) -> bool {
        self.problem_count() == 0
    }

    /// Total number of flagged artifacts across all eight sets.
    pub fn problem_count(&self) -> usize {
        self.main_used_undeclared.len()
            + self.test_used_undeclared.len()
            + self.main_unused_declared_but_used_by_test.len()
            + self.main_unused_declared.len()
            + self.test_unused_declared.len()
            + self.test_unnecessary_declarations.len()
            + self.main_unnecessary_permit_unused.len()
            + self.test_unnecessary_permit_unused.len()
    }
}

/// Classifies one module's declared dependencies against its compiled-code
/// usage. Pure function of the injected collaborator: no ambient state,
/// no side effects beyond debug traces.
pub struct Classifier<'a, G: BuildGraph> {
    graph: &'a G,
    main_class_roots: &'a [PathBuf],
    test_class_roots: &'a [PathBuf],
    /// File name of this module's own packaged output, when it has one.
    own_output: Option<&'a str>,
}

impl<'a, G: BuildGraph> Classifier<'a, G> {
    pub fn new(
        graph: &'a G,
        main_class_roots: &'a [PathBuf],
        test_class_roots: &'a [PathBuf],
        own_output: Option<&'a str>,
    ) -> Self {
        Self {
            graph,
            main_class_roots,
            test_class_roots,
            own_output,
        }
    }

    /// Run the full pipeline and emit the eight sets.
    pub fn classify(&self) -> DepauditResult<DependencyAnalysis> {
        let main = self.graph.resolve_scope(Scope::Main)?;
        let test = self.graph.resolve_scope(Scope::Test)?;
        let permit_main = self.graph.resolve_scope(Scope::PermitUnused)?;
        let permit_test = self.graph.resolve_scope(Scope::PermitUnusedTest)?;

        // Declaration-name sets. Textual matching, not resolved identity:
        // a dependency declared here may physically resolve only through
        // another module's transitive graph. The main-scope names feed no
        // set and are traced for diagnosis only.
        let main_declared_names = main.declaration_names();
        let test_declared_names = test.declaration_names();
        trace_names("main_declared_names", &main_declared_names);
        trace_names("test_declared_names", &test_declared_names);

        // Direct (first-level) artifact files per scope.
        let main_direct = artifact_files(&main.first_level);
        let test_direct = artifact_files(&test.first_level);
        let main_permit = artifact_files(&permit_main.first_level);
        let test_permit = artifact_files(&permit_test.first_level);
        trace_files("main_direct", &main_direct);
        trace_files("test_direct", &test_direct);
        trace_files("main_permit_unused", &main_permit);
        trace_files("test_permit_unused", &test_permit);

        // Test artifacts matched by textual declaration name, over the
        // scope's transitive set.
        let test_declared_by_name: BTreeSet<PathBuf> = test
            .transitive
            .iter()
            .filter(|a| test_declared_names.contains(a.file_name()))
            .map(|a| a.file.clone())
            .collect();
        trace_files("test_declared_by_name", &test_declared_by_name);

        // Artifacts reachable through chains of api edges: usable without
        // a direct declaration.
        let main_indirect =
            artifact_files(&indirect_api_closure(self.graph, &main.first_level, &main.transitive));
        let test_indirect =
            artifact_files(&indirect_api_closure(self.graph, &test.first_level, &test.transitive));
        trace_files("main_indirect_api", &main_indirect);
        trace_files("test_indirect_api", &test_indirect);

        // Used classes: own references plus one supertype level each.
        let main_used_classes = expand_used_classes(self.graph, self.main_class_roots)?;
        let test_used_classes = expand_used_classes(self.graph, self.test_class_roots)?;

        // Used artifacts: first containing artifact per used class.
        let main_class_map = build_artifact_class_map(self.graph, &main.transitive);
        let test_class_map = build_artifact_class_map(self.graph, &test.transitive);
        let main_used = used_artifact_files(&main_class_map, &main_used_classes);
        let test_used = used_artifact_files(&test_class_map, &test_used_classes);
        trace_files("main_used", &main_used);
        trace_files("test_used", &test_used);

        // --- classification pipeline, in dependency order ---

        let main_used_declared: BTreeSet<PathBuf> =
            main_direct.intersection(&main_used).cloned().collect();
        trace_files("main_used_declared", &main_used_declared);

        let main_used_undeclared: BTreeSet<PathBuf> =
            &(&main_used - &main_direct) - &main_indirect;

        let test_used_undeclared: BTreeSet<PathBuf> =
            (&(&(&test_used - &test_direct) - &test_indirect) - &main_used_declared)
                .into_iter()
                .filter(|file| Some(path_file_name(file)) != self.own_output)
                .collect();

        // Declared by main, unused by main, ignoring permitted exceptions.
        let main_unused_base: BTreeSet<PathBuf> =
            &(&main_direct - &main_used) - &main_permit;

        let main_unused_declared_but_used_by_test: BTreeSet<PathBuf> =
            main_unused_base.intersection(&test_used).cloned().collect();

        let main_unused_declared: BTreeSet<PathBuf> =
            &main_unused_base - &main_unused_declared_but_used_by_test;

        let test_unused_declared: BTreeSet<PathBuf> =
            &(&(&(&(&test_direct - &main_used) - &main_permit) - &test_permit) - &test_used)
                - &main_unused_declared;

        let test_unnecessary_declarations: BTreeSet<PathBuf> = test_declared_by_name
            .intersection(&main_used_declared)
            .cloned()
            .collect();

        let main_unnecessary_permit_unused: BTreeSet<PathBuf> =
            main_permit.intersection(&main_used).cloned().collect();
        let test_unnecessary_permit_unused: BTreeSet<PathBuf> =
            test_permit.intersection(&test_used).cloned().collect();

        trace_files("main_used_undeclared", &main_used_undeclared);
        trace_files("test_used_undeclared", &test_used_undeclared);
        trace_files(
            "main_unused_declared_but_used_by_test",
            &main_unused_declared_but_used_by_test,
        );
        trace_files("main_unused_declared", &main_unused_declared);
        trace_files("test_unused_declared", &test_unused_declared);
        trace_files("test_unnecessary_declarations", &test_unnecessary_declarations);
        trace_files("main_unnecessary_permit_unused", &main_unnecessary_permit_unused);
        trace_files("test_unnecessary_permit_unused", &test_unnecessary_permit_unused);

        // Map file identities back to artifacts out of the owning scope's
        // transitive set.
        Ok(DependencyAnalysis {
            main_used_undeclared: select(&main.transitive, &main_used_undeclared),
            test_used_undeclared: select(&test.transitive, &test_used_undeclared),
            main_unused_declared_but_used_by_test: select(
                &main.transitive,
                &main_unused_declared_but_used_by_test,
            ),
            main_unused_declared: select(&main.transitive, &main_unused_declared),
            test_unused_declared: select(&test.transitive, &test_unused_declared),
            test_unnecessary_declarations: select(&test.transitive, &test_unnecessary_declarations),
            main_unnecessary_permit_unused: select(
                &main.transitive,
                &main_unnecessary_permit_unused,
            ),
            test_unnecessary_permit_unused: select(
                &test.transitive,
                &test_unnecessary_permit_unused,
            ),
        })
    }
}

/// Picks the artifacts of `universe` whose file path is in `files`.
fn select(universe: &BTreeSet<Artifact>, files: &BTreeSet<PathBuf>) -> BTreeSet<Artifact> {
    universe
        .iter()
        .filter(|a| files.contains(&a.file))
        .cloned()
        .collect()
}

fn trace_files(step: &str, files: &BTreeSet<PathBuf>) {
    debug!(
        step,
        files = ?files.iter().map(|f| path_file_name(f)).collect::<Vec<_>>(),
        "classification step"
    );
}

fn trace_names(step: &str, names: &BTreeSet<String>) {
    debug!(step, names = ?names, "classification step");
}
