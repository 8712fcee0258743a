//! Used-class expansion and used-artifact mapping.
//!
//! "Used" has two layers. A class is used when the module's own compiled
//! output references it, or when it is a direct supertype/interface of a
//! referenced class — compilers frequently require a declared dependency
//! on the package declaring the supertype of a type being used, so one
//! level of supertype lookup is folded in per referenced class (not the
//! full chain upward). An artifact is used when any of its contained
//! classes is in the used set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::debug;

use crate::artifact::Artifact;
use crate::error::DepauditResult;
use crate::resolve::{ContentIndex, ReferenceScanner, TypeHierarchy};

/// Mapping from artifact file path to the class names it contains.
pub type ArtifactClassMap = BTreeMap<PathBuf, BTreeSet<String>>;

/// Scans the given compiled-class roots and expands the referenced set
/// with one level of supertypes per referenced class.
///
/// A supertype lookup that fails contributes no extra names.
pub fn expand_used_classes<R>(resolver: &R, roots: &[PathBuf]) -> DepauditResult<BTreeSet<String>>
where
    R: ReferenceScanner + TypeHierarchy,
{
    let referenced = resolver.scan_referenced_classes(roots)?;

    let mut used = referenced.clone();
    for class_name in &referenced {
        used.extend(resolver.lookup_supertypes(class_name));
    }

    Ok(used)
}

/// Builds the artifact → contained-classes map for a scope's transitive
/// artifact set. Only packaged (jar-like) artifacts are indexed.
pub fn build_artifact_class_map<R: ContentIndex>(
    resolver: &R,
    transitive: &BTreeSet<Artifact>,
) -> ArtifactClassMap {
    transitive
        .iter()
        .filter(|a| a.is_packaged())
        .map(|a| (a.file.clone(), resolver.scan_contained_classes(a)))
        .collect()
}

/// Maps every used class to the first artifact containing it, in artifact
/// path order, and returns the set of owning artifact files.
///
/// When several artifacts contain the same class name (shading or
/// relocation), the lexicographically smallest artifact path wins and the
/// ambiguity is traced at debug level.
pub fn used_artifact_files(
    class_map: &ArtifactClassMap,
    used_classes: &BTreeSet<String>,
) -> BTreeSet<PathBuf> {
    let mut used = BTreeSet::new();

    for class_name in used_classes {
        let mut owners = class_map
            .iter()
            .filter(|(_, classes)| classes.contains(class_name));

        if let Some((first, _)) = owners.next() {
            let shadowed: Vec<_> = owners.map(|(file, _)| file.display().to_string()).collect();
            if !shadowed.is_empty() {
                debug!(
                    class = %class_name,
                    chosen = %first.display(),
                    also_in = ?shadowed,
                    "class contained in multiple artifacts; first by path wins"
                );
            }
            used.insert(first.clone());
        }
    }

    used
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureScan {
        referenced: BTreeSet<String>,
        supertypes: BTreeMap<String, BTreeSet<String>>,
    }

    impl ReferenceScanner for FixtureScan {
        fn scan_referenced_classes(&self, _roots: &[PathBuf]) -> DepauditResult<BTreeSet<String>> {
            Ok(self.referenced.clone())
        }
    }

    impl TypeHierarchy for FixtureScan {
        fn lookup_supertypes(&self, class_name: &str) -> BTreeSet<String> {
            self.supertypes.get(class_name).cloned().unwrap_or_default()
        }
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_adds_one_supertype_level() {
        let scan = FixtureScan {
            referenced: names(&["a.A"]),
            supertypes: [
                ("a.A".to_string(), names(&["b.Base", "c.Contract"])),
                // One level only: b.Base's own supertype must not appear.
                ("b.Base".to_string(), names(&["d.Deep"])),
            ]
            .into(),
        };

        let used = expand_used_classes(&scan, &[]).unwrap();
        assert_eq!(used, names(&["a.A", "b.Base", "c.Contract"]));
    }

    #[test]
    fn test_expand_swallows_unknown_classes() {
        let scan = FixtureScan {
            referenced: names(&["a.A", "ghost.Missing"]),
            supertypes: BTreeMap::new(),
        };

        let used = expand_used_classes(&scan, &[]).unwrap();
        assert_eq!(used, names(&["a.A", "ghost.Missing"]));
    }

    #[test]
    fn test_used_artifact_files_basic() {
        let class_map: ArtifactClassMap = [
            (PathBuf::from("/repo/a-1.jar"), names(&["a.A"])),
            (PathBuf::from("/repo/b-1.jar"), names(&["b.B"])),
        ]
        .into();

        let used = used_artifact_files(&class_map, &names(&["a.A"]));
        assert_eq!(used, [PathBuf::from("/repo/a-1.jar")].into());
    }

    #[test]
    fn test_used_artifact_files_unmatched_class_is_dropped() {
        let class_map: ArtifactClassMap =
            [(PathBuf::from("/repo/a-1.jar"), names(&["a.A"]))].into();

        let used = used_artifact_files(&class_map, &names(&["x.NotShipped"]));
        assert!(used.is_empty());
    }

    #[test]
    fn test_shadowed_class_first_path_wins_deterministically() {
        let class_map: ArtifactClassMap = [
            (PathBuf::from("/repo/z-shaded-1.jar"), names(&["a.A"])),
            (PathBuf::from("/repo/a-1.jar"), names(&["a.A"])),
        ]
        .into();

        for _ in 0..3 {
            let used = used_artifact_files(&class_map, &names(&["a.A"]));
            assert_eq!(used, [PathBuf::from("/repo/a-1.jar")].into());
        }
    }

    #[test]
    fn test_class_map_skips_unpackaged_artifacts() {
        struct Index;
        impl ContentIndex for Index {
            fn scan_contained_classes(&self, artifact: &Artifact) -> BTreeSet<String> {
                names(&[&format!("{}.Cls", artifact.name)])
            }
        }

        let jar = Artifact {
            group: "g".into(),
            name: "a".into(),
            version: "1".into(),
            classifier: None,
            extension: "jar".into(),
            file: "/repo/a-1.jar".into(),
        };
        let mut dir = jar.clone();
        dir.file = "/build/classes".into();
        dir.extension = "dir".into();

        let map = build_artifact_class_map(&Index, &[jar, dir].into());
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&PathBuf::from("/repo/a-1.jar")));
    }
}
