//! Crate-level scenario tests: whole classifications over small fixture
//! builds, one scenario per test.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::artifact::DependencyDecl;
use crate::classify::DependencyAnalysis;
use crate::snapshot::{ArtifactRecord, BuildSnapshot, ProjectSnapshot, ScopeSnapshot, TypeRecord};
use crate::workspace::audit_project;

fn jar(name: &str) -> PathBuf {
    PathBuf::from(format!("/repo/{name}-1.0.jar"))
}

fn add_artifact(snapshot: &mut BuildSnapshot, name: &str, classes: &[&str]) {
    add_owned_artifact(snapshot, name, None, classes);
}

fn add_owned_artifact(
    snapshot: &mut BuildSnapshot,
    name: &str,
    project: Option<&str>,
    classes: &[&str],
) {
    snapshot.artifacts.insert(
        jar(name),
        ArtifactRecord {
            group: "com.acme".into(),
            name: name.into(),
            version: "1.0".into(),
            project: project.map(String::from),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        },
    );
}

/// Declare a first-level dependency in a scope block: textual declaration
/// plus resolved first-level and transitive membership.
fn declare(block: &mut ScopeSnapshot, name: &str) {
    block.declarations.push(DependencyDecl::new(name, "1.0"));
    block.first_level.push(jar(name));
    block.transitive.push(jar(name));
}

/// Add an artifact to a scope's transitive closure only.
fn reach(block: &mut ScopeSnapshot, name: &str) {
    block.transitive.push(jar(name));
}

/// Register the referenced classes of a project's main compiled output.
fn main_refs(snapshot: &mut BuildSnapshot, project: &str, classes: &[&str]) {
    let root = PathBuf::from(format!("/classes/{}/main", project.trim_start_matches(':')));
    snapshot
        .class_roots
        .insert(root.clone(), classes.iter().map(|c| c.to_string()).collect());
    snapshot
        .projects
        .get_mut(project)
        .unwrap()
        .main_class_roots
        .push(root);
}

/// Register the referenced classes of a project's test compiled output.
fn test_refs(snapshot: &mut BuildSnapshot, project: &str, classes: &[&str]) {
    let root = PathBuf::from(format!("/classes/{}/test", project.trim_start_matches(':')));
    snapshot
        .class_roots
        .insert(root.clone(), classes.iter().map(|c| c.to_string()).collect());
    snapshot
        .projects
        .get_mut(project)
        .unwrap()
        .test_class_roots
        .push(root);
}

fn files(set: &BTreeSet<crate::artifact::Artifact>) -> BTreeSet<String> {
    set.iter().map(|a| a.file_name().to_string()).collect()
}

fn one(name: &str) -> BTreeSet<String> {
    [format!("{name}-1.0.jar")].into()
}

/// The union size of all eight sets, counting duplicates.
fn total_flagged(analysis: &DependencyAnalysis) -> usize {
    analysis.problem_count()
}

#[test]
fn declared_and_used_is_clean() {
    // Module a has no dependencies; b declares a and references its class.
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":a".into(), ProjectSnapshot::default());
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_owned_artifact(&mut snapshot, "a", Some(":a"), &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "a");
    main_refs(&mut snapshot, ":b", &["com.acme.a.A"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert!(analysis.is_clean(), "expected clean, got {analysis:?}");
}

#[test]
fn declared_never_used_is_unused_declared() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "a");

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.main_unused_declared), one("a"));
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn declared_in_main_used_only_by_test_moves_scope() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "a");
    reach(&mut b.test, "a");
    test_refs(&mut snapshot, ":b", &["com.acme.a.A"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(
        files(&analysis.main_unused_declared_but_used_by_test),
        one("a")
    );
    assert!(analysis.main_unused_declared.is_empty());
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn used_without_declaration_is_flagged() {
    // a arrives in b's transitive closure through m, with no api edge.
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":m".into(), ProjectSnapshot::default());
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_owned_artifact(&mut snapshot, "m", Some(":m"), &["com.acme.m.M"]);
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "m");
    reach(&mut b.main, "a");
    main_refs(&mut snapshot, ":b", &["com.acme.m.M", "com.acme.a.A"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.main_used_undeclared), one("a"));
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn api_exposed_artifact_needs_no_declaration() {
    // b -> m (declared); m re-exports a through its api configuration.
    let mut snapshot = BuildSnapshot::default();
    let mut m = ProjectSnapshot::default();
    m.api_declarations.push(DependencyDecl::new("a", "1.0"));
    snapshot.projects.insert(":m".into(), m);
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_owned_artifact(&mut snapshot, "m", Some(":m"), &["com.acme.m.M"]);
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "m");
    reach(&mut b.main, "a");
    main_refs(&mut snapshot, ":b", &["com.acme.m.M", "com.acme.a.A"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert!(!analysis
        .main_used_undeclared
        .iter()
        .any(|x| x.name == "a"));
    assert!(analysis.is_clean());
}

#[test]
fn api_exemption_holds_through_chains() {
    // b -> m; m api-exposes n; n api-exposes a; b uses only a's classes.
    let mut snapshot = BuildSnapshot::default();
    let mut m = ProjectSnapshot::default();
    m.api_declarations.push(DependencyDecl::new("n", "1.0"));
    let mut n = ProjectSnapshot::default();
    n.api_declarations.push(DependencyDecl::new("a", "1.0"));
    snapshot.projects.insert(":m".into(), m);
    snapshot.projects.insert(":n".into(), n);
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_owned_artifact(&mut snapshot, "m", Some(":m"), &["com.acme.m.M"]);
    add_owned_artifact(&mut snapshot, "n", Some(":n"), &["com.acme.n.N"]);
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "m");
    reach(&mut b.main, "n");
    reach(&mut b.main, "a");
    main_refs(&mut snapshot, ":b", &["com.acme.m.M", "com.acme.a.A"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert!(analysis.main_used_undeclared.is_empty());
}

#[test]
fn permitted_unused_dependency_is_not_reported() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "a");
    declare(&mut b.permit_unused, "a");

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert!(analysis.is_clean(), "permitted artifact leaked: {analysis:?}");
}

#[test]
fn used_permit_exception_is_stale() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "a");
    declare(&mut b.permit_unused, "a");
    main_refs(&mut snapshot, ":b", &["com.acme.a.A"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.main_unnecessary_permit_unused), one("a"));
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn test_scope_permit_exception_mirrors_main() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "t", &["com.acme.t.T"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.test, "t");
    declare(&mut b.permit_unused_test, "t");
    test_refs(&mut snapshot, ":b", &["com.acme.t.T"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.test_unnecessary_permit_unused), one("t"));
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn test_declared_never_used_is_flagged() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "t", &["com.acme.t.T"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.test, "t");

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.test_unused_declared), one("t"));
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn test_declaration_shadowing_used_main_declaration_is_unnecessary() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "a");
    declare(&mut b.test, "a");
    main_refs(&mut snapshot, ":b", &["com.acme.a.A"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.test_unnecessary_declarations), one("a"));
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn own_output_is_excluded_from_test_used_undeclared() {
    let mut snapshot = BuildSnapshot::default();
    let mut b = ProjectSnapshot::default();
    b.output_artifact = Some("b-1.0.jar".into());
    snapshot.projects.insert(":b".into(), b);
    add_owned_artifact(&mut snapshot, "b", Some(":b"), &["com.acme.b.B"]);
    add_artifact(&mut snapshot, "x", &["com.acme.x.X"]);

    let project = snapshot.projects.get_mut(":b").unwrap();
    reach(&mut project.test, "b");
    reach(&mut project.test, "x");
    test_refs(&mut snapshot, ":b", &["com.acme.b.B", "com.acme.x.X"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.test_used_undeclared), one("x"));
}

#[test]
fn supertype_reference_counts_as_usage() {
    // b references only p's Impl; Impl extends Base which ships in q.
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "p", &["com.acme.p.Impl"]);
    add_artifact(&mut snapshot, "q", &["com.acme.q.Base"]);
    snapshot.types.insert(
        "com.acme.p.Impl".into(),
        TypeRecord {
            superclass: Some("com.acme.q.Base".into()),
            interfaces: vec![],
        },
    );

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "p");
    declare(&mut b.main, "q");
    main_refs(&mut snapshot, ":b", &["com.acme.p.Impl"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert!(
        !analysis.main_unused_declared.iter().any(|a| a.name == "q"),
        "supertype owner must count as used"
    );
    assert!(analysis.is_clean());
}

#[test]
fn unresolvable_types_degrade_to_no_extra_usage() {
    // Same fixture as above but with no supertype table entry: q really
    // is unused then.
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "p", &["com.acme.p.Impl"]);
    add_artifact(&mut snapshot, "q", &["com.acme.q.Base"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "p");
    declare(&mut b.main, "q");
    main_refs(&mut snapshot, ":b", &["com.acme.p.Impl"]);

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.main_unused_declared), one("q"));
}

#[test]
fn unused_in_both_scopes_is_reported_once() {
    let mut snapshot = BuildSnapshot::default();
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "a");
    declare(&mut b.test, "a");

    let analysis = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(files(&analysis.main_unused_declared), one("a"));
    assert!(analysis.test_unused_declared.is_empty());
    assert!(analysis.test_unnecessary_declarations.is_empty());
    assert_eq!(total_flagged(&analysis), 1);
}

#[test]
fn classification_is_idempotent() {
    let mut snapshot = BuildSnapshot::default();
    let mut m = ProjectSnapshot::default();
    m.api_declarations.push(DependencyDecl::new("a", "1.0"));
    snapshot.projects.insert(":m".into(), m);
    snapshot.projects.insert(":b".into(), ProjectSnapshot::default());
    add_owned_artifact(&mut snapshot, "m", Some(":m"), &["com.acme.m.M"]);
    add_artifact(&mut snapshot, "a", &["com.acme.a.A"]);
    add_artifact(&mut snapshot, "stale", &["com.acme.s.S"]);

    let b = snapshot.projects.get_mut(":b").unwrap();
    declare(&mut b.main, "m");
    declare(&mut b.main, "stale");
    reach(&mut b.main, "a");
    main_refs(&mut snapshot, ":b", &["com.acme.a.A"]);

    let first = audit_project(&snapshot, ":b").unwrap();
    let second = audit_project(&snapshot, ":b").unwrap();
    assert_eq!(first, second);
    assert_eq!(files(&first.main_unused_declared), one("stale"));
}
