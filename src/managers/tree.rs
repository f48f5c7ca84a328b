use std::collections::HashSet;

use crate::core::types::{Dependency, DependencyKind, DependencyTreeNode};
use crate::error::{Result, SweepError};
use crate::managers::traits::PackageManager;

/// Maximum node depth expanded below the root.
pub const MAX_DEPTH: usize = 3;

/// Resolve the dependency tree rooted at `root`.
///
/// Recursion is bounded two ways: nodes at `MAX_DEPTH` are not expanded, and
/// a `name@version` already present on the current root-to-node path is
/// emitted once more as a leaf instead of recursing into a cycle. Every
/// branch gets its own clone of the visited set, so sibling branches can
/// both expand a dependency they share.
pub fn build<M: PackageManager + ?Sized>(manager: &M, root: &str) -> Result<DependencyTreeNode> {
    let info = manager
        .package_info(root)?
        .ok_or_else(|| SweepError::PackageNotFound(root.to_string()))?;

    let mut node = DependencyTreeNode {
        name: info.name.clone(),
        version: info.version.clone(),
        kind: DependencyKind::Direct,
        is_shared: false,
        children: Vec::new(),
        depth: 0,
    };

    let mut visited = HashSet::new();
    visited.insert(format!("{}@{}", info.name, info.version));

    for dep in manager.dependencies(root)? {
        node.children
            .push(build_branch(manager, &dep, 1, visited.clone()));
    }
    Ok(node)
}

fn build_branch<M: PackageManager + ?Sized>(
    manager: &M,
    dep: &Dependency,
    depth: usize,
    mut visited: HashSet<String>,
) -> DependencyTreeNode {
    let mut node = DependencyTreeNode {
        name: dep.name.clone(),
        version: dep.version.clone(),
        kind: dep.kind.clone(),
        is_shared: dep.is_shared,
        children: Vec::new(),
        depth,
    };

    let key = format!("{}@{}", dep.name, dep.version);
    if depth >= MAX_DEPTH || visited.contains(&key) {
        return node;
    }
    visited.insert(key);

    // A failure resolving a sub-dependency ends this branch, not the tree.
    let Ok(subs) = manager.dependencies(&dep.name) else {
        return node;
    };
    for sub in subs {
        node.children
            .push(build_branch(manager, &sub, depth + 1, visited.clone()));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ManagerKind, Package};
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct MockManager {
        packages: Vec<Package>,
        edges: HashMap<String, Vec<Dependency>>,
        fail_deps: HashSet<String>,
    }

    impl MockManager {
        fn new(names: &[&str], edges: &[(&str, &[&str])]) -> Self {
            let packages = names
                .iter()
                .map(|n| {
                    Package::new(
                        n.to_string(),
                        "1.0.0".to_string(),
                        ManagerKind::Npm,
                        PathBuf::from("/tmp"),
                    )
                })
                .collect();
            let edges = edges
                .iter()
                .map(|(from, tos)| (from.to_string(), tos.iter().map(|t| dep(t)).collect()))
                .collect();
            MockManager {
                packages,
                edges,
                fail_deps: HashSet::new(),
            }
        }
    }

    fn dep(name: &str) -> Dependency {
        Dependency {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            kind: DependencyKind::Direct,
            is_shared: false,
            used_by: Vec::new(),
            size: 0,
        }
    }

    impl PackageManager for MockManager {
        fn kind(&self) -> ManagerKind {
            ManagerKind::Npm
        }
        fn display_name(&self) -> &str {
            "mock"
        }
        fn command(&self) -> &str {
            "mock"
        }
        fn is_available(&self) -> bool {
            true
        }
        fn list_packages(&self, _global_only: bool) -> Result<Vec<Package>> {
            Ok(self.packages.clone())
        }
        fn package_info(&self, name: &str) -> Result<Option<Package>> {
            Ok(self.packages.iter().find(|p| p.name == name).cloned())
        }
        fn dependencies(&self, name: &str) -> Result<Vec<Dependency>> {
            if self.fail_deps.contains(name) {
                return Err(SweepError::Other(format!("no dependency data for {name}")));
            }
            Ok(self.edges.get(name).cloned().unwrap_or_default())
        }
        fn uninstall(&self, _name: &str) -> Result<()> {
            Ok(())
        }
        fn upgrade(&self, _name: &str, _version: Option<&str>) -> Result<()> {
            Ok(())
        }
        fn latest_version(&self, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn cycle_is_emitted_as_leaf() {
        let mock = MockManager::new(&["a"], &[("a", &["b"]), ("b", &["a"])]);
        // Through the trait default so the wiring is exercised too.
        let tree = mock.dependency_tree("a").unwrap();

        assert_eq!(tree.name, "a");
        assert_eq!(tree.depth, 0);
        assert_eq!(tree.children.len(), 1);

        let b = &tree.children[0];
        assert_eq!(b.name, "b");
        assert_eq!(b.depth, 1);
        assert_eq!(b.children.len(), 1);

        let a_again = &b.children[0];
        assert_eq!(a_again.name, "a");
        assert_eq!(a_again.depth, 2);
        assert!(a_again.children.is_empty());
    }

    #[test]
    fn depth_is_capped() {
        let mock = MockManager::new(
            &["a"],
            &[
                ("a", &["b"]),
                ("b", &["c"]),
                ("c", &["d"]),
                ("d", &["e"]),
            ],
        );
        let tree = build(&mock, "a").unwrap();

        let mut node = &tree;
        while let Some(child) = node.children.first() {
            node = child;
        }
        assert_eq!(node.name, "d");
        assert_eq!(node.depth, MAX_DEPTH);
        assert!(node.children.is_empty());
    }

    #[test]
    fn sibling_branches_expand_shared_dependencies_independently() {
        let mock = MockManager::new(
            &["a"],
            &[("a", &["x", "y"]), ("x", &["z"]), ("y", &["z"])],
        );
        let tree = build(&mock, "a").unwrap();

        assert_eq!(tree.children.len(), 2);
        for child in &tree.children {
            assert_eq!(child.children.len(), 1);
            assert_eq!(child.children[0].name, "z");
        }
    }

    #[test]
    fn branch_failure_yields_leaf() {
        let mut mock = MockManager::new(&["a"], &[("a", &["b"]), ("b", &["c"])]);
        mock.fail_deps.insert("b".to_string());
        let tree = build(&mock, "a").unwrap();

        let b = &tree.children[0];
        assert_eq!(b.name, "b");
        assert!(b.children.is_empty());
    }

    #[test]
    fn missing_root_is_package_not_found() {
        let mock = MockManager::new(&["a"], &[]);
        let err = build(&mock, "missing").unwrap_err();
        assert!(matches!(err, SweepError::PackageNotFound(_)));
    }
}
