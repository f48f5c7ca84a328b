use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::core::types::{Dependency, DependencyKind, ManagerKind, Package};
use crate::error::{Result, SweepError};
use crate::exec;
use crate::managers::traits::PackageManager;
use crate::ui;
use crate::utils::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFlavor {
    Npm,
    Pnpm,
    Yarn,
}

/// Shared adapter for the Node package managers. npm, pnpm and yarn differ
/// only in command spelling and list output shape, so one implementation
/// carries all three flavors.
pub struct NodeAdapter {
    flavor: NodeFlavor,
    root: OnceLock<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct NodeList {
    #[serde(default)]
    dependencies: HashMap<String, NodeDep>,
}

#[derive(Debug, Deserialize)]
struct NodeDep {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: HashMap<String, NodeDep>,
}

#[derive(Debug, Deserialize)]
struct YarnLine {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<YarnData>,
}

#[derive(Debug, Deserialize)]
struct YarnData {
    #[serde(default)]
    trees: Vec<YarnTree>,
}

#[derive(Debug, Deserialize)]
struct YarnTree {
    name: String,
}

impl NodeAdapter {
    pub fn npm() -> Self {
        Self::with_flavor(NodeFlavor::Npm)
    }

    pub fn pnpm() -> Self {
        Self::with_flavor(NodeFlavor::Pnpm)
    }

    pub fn yarn() -> Self {
        Self::with_flavor(NodeFlavor::Yarn)
    }

    fn with_flavor(flavor: NodeFlavor) -> Self {
        Self {
            flavor,
            root: OnceLock::new(),
        }
    }

    // Global module root, resolved once per process. npm and pnpm answer
    // `root -g` directly; yarn reports its global dir which contains a
    // node_modules underneath.
    fn global_root(&self) -> PathBuf {
        self.root
            .get_or_init(|| {
                let resolved = match self.flavor {
                    NodeFlavor::Yarn => self
                        .execute(&["global", "dir"])
                        .map(|out| PathBuf::from(out.trim()).join("node_modules")),
                    _ => self.execute(&["root", "-g"]).map(|out| PathBuf::from(out.trim())),
                };
                resolved.unwrap_or_else(|_| fallback_root(self.flavor))
            })
            .clone()
    }

    fn build_package(&self, name: &str, version: &str, is_global: bool) -> Package {
        let install_path = if is_global {
            self.global_root().join(name)
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join("node_modules")
                .join(name)
        };

        let mut pkg = Package::new(
            name.to_string(),
            version.to_string(),
            self.kind(),
            install_path,
        );
        pkg.is_dev = Some(false);
        pkg.is_global = Some(is_global);
        pkg
    }
}

impl PackageManager for NodeAdapter {
    fn kind(&self) -> ManagerKind {
        match self.flavor {
            NodeFlavor::Npm => ManagerKind::Npm,
            NodeFlavor::Pnpm => ManagerKind::Pnpm,
            NodeFlavor::Yarn => ManagerKind::Yarn,
        }
    }

    fn display_name(&self) -> &str {
        match self.flavor {
            NodeFlavor::Npm => "npm",
            NodeFlavor::Pnpm => "pnpm",
            NodeFlavor::Yarn => "yarn",
        }
    }

    fn command(&self) -> &str {
        match self.flavor {
            NodeFlavor::Npm => "npm",
            NodeFlavor::Pnpm => "pnpm",
            NodeFlavor::Yarn => "yarn",
        }
    }

    fn list_packages(&self, global_only: bool) -> Result<Vec<Package>> {
        let output = match (self.flavor, global_only) {
            (NodeFlavor::Yarn, true) => self.execute(&["global", "list", "--json"])?,
            (NodeFlavor::Yarn, false) => self.execute(&["list", "--json"])?,
            (_, true) => self.execute(&["list", "-g", "--json", "--depth=0"])?,
            (_, false) => self.execute(&["list", "--json", "--depth=0"])?,
        };

        let entries = match self.flavor {
            NodeFlavor::Npm => parse_npm_list(&output)?,
            NodeFlavor::Pnpm => parse_pnpm_list(&output)?,
            NodeFlavor::Yarn => parse_yarn_list(&output),
        };

        Ok(entries
            .into_iter()
            .map(|(name, version)| self.build_package(&name, &version, global_only))
            .collect())
    }

    fn package_info(&self, name: &str) -> Result<Option<Package>> {
        if self.flavor == NodeFlavor::Yarn {
            // yarn classic has no single-package global query; scan the list.
            return Ok(self.list_packages(true)?.into_iter().find(|p| p.name == name));
        }

        let Ok(output) = self.execute(&["list", "-g", "--json", name]) else {
            return Ok(None);
        };
        let entries = match self.flavor {
            NodeFlavor::Npm => parse_npm_list(&output),
            _ => parse_pnpm_list(&output),
        };
        let Ok(entries) = entries else {
            return Ok(None);
        };
        Ok(entries
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(n, v)| self.build_package(&n, &v, true)))
    }

    fn dependencies(&self, name: &str) -> Result<Vec<Dependency>> {
        if self.flavor == NodeFlavor::Yarn {
            return Ok(Vec::new());
        }

        let Ok(output) = self.execute(&["list", "-g", "--json", name]) else {
            return Ok(Vec::new());
        };
        let root = self.global_root();
        Ok(parse_node_dependencies(&output, name)
            .into_iter()
            .map(|(dep_name, version)| {
                let size = paths::directory_size(&root.join(&dep_name));
                Dependency {
                    name: dep_name,
                    version,
                    kind: DependencyKind::Direct,
                    is_shared: false,
                    used_by: vec![name.to_string()],
                    size,
                }
            })
            .collect())
    }

    fn uninstall(&self, name: &str) -> Result<()> {
        match self.flavor {
            NodeFlavor::Npm => self.execute(&["uninstall", "-g", name])?,
            NodeFlavor::Pnpm => self.execute(&["remove", "-g", name])?,
            NodeFlavor::Yarn => self.execute(&["global", "remove", name])?,
        };
        Ok(())
    }

    fn upgrade(&self, name: &str, version: Option<&str>) -> Result<()> {
        match self.flavor {
            NodeFlavor::Yarn => {
                let spec = match version {
                    Some(v) => format!("{name}@{v}"),
                    None => name.to_string(),
                };
                self.execute(&["global", "upgrade", &spec])?;
            }
            _ => {
                let spec = format!("{name}@{}", version.unwrap_or("latest"));
                self.execute(&["install", "-g", &spec])?;
            }
        };
        Ok(())
    }

    fn latest_version(&self, name: &str) -> Result<Option<String>> {
        if self.flavor == NodeFlavor::Yarn {
            return match self.execute(&["info", name, "version"]) {
                Ok(output) => Ok(parse_yarn_info_version(&output)),
                Err(_) => Ok(None),
            };
        }

        match self.execute(&["view", name, "version"]) {
            Ok(output) => {
                let version = output.trim();
                if version.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(version.to_string()))
                }
            }
            Err(e) => {
                ui::warning(&format!("Failed to get latest version for {name}: {e}"));
                Ok(None)
            }
        }
    }
}

fn fallback_root(flavor: NodeFlavor) -> PathBuf {
    let home = directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_default();
    match flavor {
        NodeFlavor::Yarn => home
            .join(".config")
            .join("yarn")
            .join("global")
            .join("node_modules"),
        _ => home.join(".npm-global").join("lib").join("node_modules"),
    }
}

fn parse_error(manager: ManagerKind, e: serde_json::Error) -> SweepError {
    SweepError::ParseError {
        manager,
        message: e.to_string(),
    }
}

// `npm list -g --json --depth=0`: one object with a `dependencies` map.
// Sorted by name so scans are deterministic.
fn parse_npm_list(json: &str) -> Result<Vec<(String, String)>> {
    let list: NodeList =
        serde_json::from_str(json).map_err(|e| parse_error(ManagerKind::Npm, e))?;
    Ok(sorted_entries(list.dependencies))
}

// `pnpm list -g --json`: an array of project trees, each with its own
// `dependencies` map. Older versions emit the npm-style single object.
fn parse_pnpm_list(json: &str) -> Result<Vec<(String, String)>> {
    if let Ok(projects) = serde_json::from_str::<Vec<NodeList>>(json) {
        let mut merged = HashMap::new();
        for project in projects {
            merged.extend(project.dependencies);
        }
        return Ok(sorted_entries(merged));
    }
    let list: NodeList =
        serde_json::from_str(json).map_err(|e| parse_error(ManagerKind::Pnpm, e))?;
    Ok(sorted_entries(list.dependencies))
}

// `yarn global list --json` is newline-delimited JSON; only `type:"tree"`
// records carry packages. Listing order is preserved; malformed lines and
// progress records are skipped.
fn parse_yarn_list(output: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let Ok(record) = serde_json::from_str::<YarnLine>(line) else {
            continue;
        };
        if record.kind != "tree" {
            continue;
        }
        let Some(data) = record.data else {
            continue;
        };
        for tree in data.trees {
            let (name, version) = split_name_version(&tree.name);
            if !name.is_empty() {
                entries.push((name, version));
            }
        }
    }
    entries
}

// Split "name@version", honoring scoped names: the version separator is the
// last '@', so "@scope/tool@1.2.3" keeps its scope.
fn split_name_version(spec: &str) -> (String, String) {
    match spec.rsplit_once('@') {
        Some((name, version)) if !name.is_empty() => (name.to_string(), version.to_string()),
        _ => (spec.to_string(), "unknown".to_string()),
    }
}

// Direct dependencies of `name` from a single-package `list -g --json` call.
fn parse_node_dependencies(json: &str, name: &str) -> Vec<(String, String)> {
    let find = |list: NodeList| {
        list.dependencies
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, dep)| sorted_entries(dep.dependencies))
    };

    if let Ok(projects) = serde_json::from_str::<Vec<NodeList>>(json) {
        return projects.into_iter().find_map(find).unwrap_or_default();
    }
    serde_json::from_str::<NodeList>(json)
        .ok()
        .and_then(find)
        .unwrap_or_default()
}

fn sorted_entries(deps: HashMap<String, NodeDep>) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = deps
        .into_iter()
        .map(|(name, dep)| (name, dep.version.unwrap_or_else(|| "unknown".to_string())))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

// yarn classic wraps its answers in banner lines ("yarn info v1.22.22",
// "Done in 0.07s."); the version is the first line that starts with a digit.
fn parse_yarn_info_version(output: &str) -> Option<String> {
    exec::parse_lines(output)
        .into_iter()
        .find(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npm_list_is_sorted_by_name() {
        let json = r#"{
            "name": "lib",
            "dependencies": {
                "typescript": { "version": "5.4.5" },
                "eslint": { "version": "9.0.0" },
                "corepack": {}
            }
        }"#;
        let entries = parse_npm_list(json).unwrap();
        assert_eq!(
            entries,
            vec![
                ("corepack".to_string(), "unknown".to_string()),
                ("eslint".to_string(), "9.0.0".to_string()),
                ("typescript".to_string(), "5.4.5".to_string()),
            ]
        );
    }

    #[test]
    fn npm_list_garbage_is_a_parse_error() {
        assert!(parse_npm_list("not json").is_err());
    }

    #[test]
    fn pnpm_list_merges_project_trees() {
        let json = r#"[
            { "name": "global", "path": "/g1", "dependencies": { "tldr": { "version": "3.3.0" } } },
            { "name": "global2", "path": "/g2", "dependencies": { "cowsay": { "version": "1.6.0" } } }
        ]"#;
        let entries = parse_pnpm_list(json).unwrap();
        assert_eq!(
            entries,
            vec![
                ("cowsay".to_string(), "1.6.0".to_string()),
                ("tldr".to_string(), "3.3.0".to_string()),
            ]
        );
    }

    #[test]
    fn pnpm_list_accepts_npm_shape() {
        let json = r#"{ "dependencies": { "tldr": { "version": "3.3.0" } } }"#;
        let entries = parse_pnpm_list(json).unwrap();
        assert_eq!(entries, vec![("tldr".to_string(), "3.3.0".to_string())]);
    }

    #[test]
    fn yarn_list_keeps_tree_records_only() {
        let output = r#"{"type":"activityStart","data":{"id":0}}
{"type":"tree","data":{"trees":[{"name":"typescript@5.4.5","children":[]},{"name":"@scope/tool@1.2.3","children":[]}]}}
not even json
{"type":"info","data":"done"}"#;
        let entries = parse_yarn_list(output);
        assert_eq!(
            entries,
            vec![
                ("typescript".to_string(), "5.4.5".to_string()),
                ("@scope/tool".to_string(), "1.2.3".to_string()),
            ]
        );
    }

    #[test]
    fn scoped_names_split_on_last_at() {
        assert_eq!(
            split_name_version("@scope/tool@1.2.3"),
            ("@scope/tool".to_string(), "1.2.3".to_string())
        );
        assert_eq!(
            split_name_version("typescript@5.4.5"),
            ("typescript".to_string(), "5.4.5".to_string())
        );
        assert_eq!(
            split_name_version("bare"),
            ("bare".to_string(), "unknown".to_string())
        );
    }

    #[test]
    fn node_dependencies_come_from_the_package_node() {
        let json = r#"{
            "dependencies": {
                "sweep-cli": {
                    "version": "1.0.0",
                    "dependencies": {
                        "ora": {},
                        "chalk": { "version": "5.3.0" }
                    }
                }
            }
        }"#;
        let deps = parse_node_dependencies(json, "sweep-cli");
        assert_eq!(
            deps,
            vec![
                ("chalk".to_string(), "5.3.0".to_string()),
                ("ora".to_string(), "unknown".to_string()),
            ]
        );
        assert!(parse_node_dependencies(json, "absent").is_empty());
    }

    #[test]
    fn yarn_info_version_skips_banners() {
        let output = "yarn info v1.22.22\n5.9.2\nDone in 0.66s.\n";
        assert_eq!(parse_yarn_info_version(output).as_deref(), Some("5.9.2"));
        assert_eq!(parse_yarn_info_version("yarn info v1.22.22\n"), None);
    }
}
