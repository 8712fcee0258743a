//! Indirect-API closure over re-exported dependency edges.
//!
//! A project may use classes from an artifact it never declared, provided
//! some declared dependency re-exports that artifact through its `api`
//! configuration — possibly through a chain of such edges. This module
//! computes the set of artifacts reachable that way.
//!
//! The edge graph is built once per scope: node = artifact file path in
//! the scope's transitive universe, edge a→b when a's owning project has
//! an `api` declaration whose file name matches b. The closure is a
//! multi-source BFS from the scope's first-level artifacts, collecting
//! every node *entered through an edge*. Seeds themselves are excluded
//! unless some edge re-exposes them. The visited set makes the traversal a
//! true fixed point: it terminates on `api` cycles, and each round either
//! adds an artifact or ends the walk.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::artifact::Artifact;
use crate::resolve::ApiResolver;

/// Builds the api-edge graph over the artifact universe.
///
/// Uses `DiGraphMap<&Path, ()>` — path slices borrowed from the universe,
/// unit edges — matching how artifact identity works everywhere else.
fn build_api_graph<'a, R: ApiResolver>(
    resolver: &R,
    universe: &'a BTreeSet<Artifact>,
) -> DiGraphMap<&'a Path, ()> {
    // Name index: artifact file name -> artifacts carrying it.
    let mut by_name: BTreeMap<&str, Vec<&'a Artifact>> = BTreeMap::new();
    for artifact in universe {
        by_name.entry(artifact.file_name()).or_default().push(artifact);
    }

    let mut graph = DiGraphMap::new();
    for artifact in universe {
        graph.add_node(artifact.file.as_path());
        for decl in resolver.project_api_dependencies(artifact) {
            let exposed_name = decl.artifact_file_name();
            if let Some(targets) = by_name.get(exposed_name.as_str()) {
                for target in targets {
                    graph.add_edge(artifact.file.as_path(), target.file.as_path(), ());
                }
            }
        }
    }

    graph
}

/// Computes the artifacts exposed to the seed set through chains of `api`
/// edges, within the given transitive universe.
///
/// Only artifacts owned by same-graph projects contribute edges (external
/// packages resolve to no `api` declarations). The result never contains a
/// seed that was not itself re-exposed by another member of the closure.
pub fn indirect_api_closure<R: ApiResolver>(
    resolver: &R,
    seed: &BTreeSet<Artifact>,
    universe: &BTreeSet<Artifact>,
) -> BTreeSet<Artifact> {
    let graph = build_api_graph(resolver, universe);

    let mut exposed: BTreeSet<&Path> = BTreeSet::new();
    let mut visited: BTreeSet<&Path> = BTreeSet::new();
    let mut queue: VecDeque<&Path> = VecDeque::new();

    for artifact in seed {
        let node = artifact.file.as_path();
        if graph.contains_node(node) && visited.insert(node) {
            queue.push_back(node);
        }
    }

    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            // Entered through an edge: part of the closure even when it
            // was a seed.
            exposed.insert(next);
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    debug!(
        seed = seed.len(),
        universe = universe.len(),
        exposed = exposed.len(),
        "indirect api closure"
    );

    universe
        .iter()
        .filter(|a| exposed.contains(a.file.as_path()))
        .cloned()
        .collect()
}
