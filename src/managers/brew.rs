use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{LazyLock, OnceLock};

use crate::core::types::{Dependency, DependencyKind, ManagerKind, Package};
use crate::error::{Result, SweepError};
use crate::exec;
use crate::managers::traits::PackageManager;
use crate::ui;
use crate::utils::paths;

// First package-name-ish token on a `brew deps --tree` line, after the
// box-drawing glyphs. '+' matters for names like libsigc++.
static DEP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-z0-9@._+-]+").expect("Invalid regex pattern"));

/// Homebrew adapter serving both inventories: formulae (CLI tools under the
/// cellar) and casks (application bundles). Listed packages are tagged
/// `Brew` or `BrewCask`; mutating commands consult the installed cask list
/// to decide whether `--cask` is needed.
pub struct BrewAdapter {
    prefix: OnceLock<PathBuf>,
    cask_tokens: OnceLock<HashSet<String>>,
}

#[derive(Debug, Deserialize)]
struct BrewInfoResponse {
    #[serde(default)]
    formulae: Vec<FormulaInfo>,
    #[serde(default)]
    casks: Vec<CaskInfo>,
}

#[derive(Debug, Deserialize)]
struct FormulaInfo {
    name: String,
    #[serde(default)]
    desc: Option<String>,
    versions: FormulaVersions,
}

#[derive(Debug, Deserialize)]
struct FormulaVersions {
    #[serde(default)]
    stable: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaskInfo {
    token: String,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl BrewAdapter {
    pub fn new() -> Self {
        Self {
            prefix: OnceLock::new(),
            cask_tokens: OnceLock::new(),
        }
    }

    // `brew --prefix`, resolved once. Falls back to the conventional install
    // roots when brew itself cannot answer.
    fn prefix(&self) -> PathBuf {
        self.prefix
            .get_or_init(|| match self.execute(&["--prefix"]) {
                Ok(output) => PathBuf::from(output.trim()),
                Err(_) => {
                    if std::env::consts::ARCH == "aarch64" {
                        PathBuf::from("/opt/homebrew")
                    } else {
                        PathBuf::from("/usr/local")
                    }
                }
            })
            .clone()
    }

    fn is_cask(&self, name: &str) -> bool {
        self.cask_tokens
            .get_or_init(|| match self.execute(&["list", "--cask", "-1"]) {
                Ok(output) => exec::parse_lines(&output).into_iter().collect(),
                Err(_) => HashSet::new(),
            })
            .contains(name)
    }

    fn list_formulae(&self) -> Result<Vec<Package>> {
        // Only packages the user asked for; auto-installed dependencies are
        // surfaced through previews instead of cluttering the inventory.
        let names = exec::parse_lines(&self.execute(&["list", "--installed-on-request", "-1"])?);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = vec!["info", "--formula", "--json=v2"];
        args.extend(names.iter().map(String::as_str));
        let response = parse_info_response(&self.execute(&args)?)?;
        let by_name: HashMap<&str, &FormulaInfo> = response
            .formulae
            .iter()
            .map(|f| (f.name.as_str(), f))
            .collect();

        let prefix = self.prefix();
        let mut packages = Vec::new();
        for name in &names {
            let Some(info) = by_name.get(name.as_str()) else {
                ui::warning(&format!("Skipping {name}: no formula info returned"));
                continue;
            };
            packages.push(self.formula_package(name, info, &prefix));
        }
        Ok(packages)
    }

    fn list_casks(&self) -> Result<Vec<Package>> {
        let tokens = exec::parse_lines(&self.execute(&["list", "--cask", "-1"])?);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = vec!["info", "--cask", "--json=v2"];
        args.extend(tokens.iter().map(String::as_str));
        let response = parse_info_response(&self.execute(&args)?)?;
        let by_token: HashMap<&str, &CaskInfo> = response
            .casks
            .iter()
            .map(|c| (c.token.as_str(), c))
            .collect();

        let mut packages = Vec::new();
        for token in &tokens {
            let Some(info) = by_token.get(token.as_str()) else {
                ui::warning(&format!("Skipping cask {token}: no info returned"));
                continue;
            };
            packages.push(cask_package(token, info));
        }
        Ok(packages)
    }

    fn formula_package(&self, name: &str, info: &FormulaInfo, prefix: &std::path::Path) -> Package {
        let version = info
            .versions
            .stable
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let mut install_path = prefix.join("Cellar").join(name).join(&version);
        if !install_path.exists() {
            let opt = prefix.join("opt").join(name);
            if opt.exists() {
                install_path = opt;
            }
        }

        let mut pkg = Package::new(name.to_string(), version, ManagerKind::Brew, install_path);
        pkg.description = info.desc.clone();
        pkg.is_dev = Some(false);
        pkg.is_global = Some(true);
        pkg
    }

    fn fetch_formula(&self, name: &str) -> Result<Option<FormulaInfo>> {
        // Unknown formulae make brew exit non-zero; that is a lookup miss,
        // not an error.
        let Ok(output) = self.execute(&["info", "--formula", "--json=v2", name]) else {
            return Ok(None);
        };
        match parse_info_response(&output) {
            Ok(response) => Ok(response.formulae.into_iter().next()),
            Err(_) => Ok(None),
        }
    }

    fn fetch_cask(&self, token: &str) -> Result<Option<CaskInfo>> {
        let Ok(output) = self.execute(&["info", "--cask", "--json=v2", token]) else {
            return Ok(None);
        };
        match parse_info_response(&output) {
            Ok(response) => Ok(response.casks.into_iter().next()),
            Err(_) => Ok(None),
        }
    }
}

impl Default for BrewAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for BrewAdapter {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Brew
    }

    fn display_name(&self) -> &str {
        "Homebrew"
    }

    fn command(&self) -> &str {
        "brew"
    }

    fn list_packages(&self, global_only: bool) -> Result<Vec<Package>> {
        let mut packages = self.list_formulae()?;
        if !global_only {
            // Casks may be unsupported (Linuxbrew); keep the formulae.
            match self.list_casks() {
                Ok(casks) => packages.extend(casks),
                Err(e) => ui::warning(&format!("Skipping casks: {e}")),
            }
        }
        Ok(packages)
    }

    fn package_info(&self, name: &str) -> Result<Option<Package>> {
        if let Some(info) = self.fetch_formula(name)? {
            return Ok(Some(self.formula_package(name, &info, &self.prefix())));
        }
        Ok(self.fetch_cask(name)?.map(|info| cask_package(name, &info)))
    }

    fn dependencies(&self, name: &str) -> Result<Vec<Dependency>> {
        // Leaf formulae and casks have no tree; treat any failure as "none".
        let Ok(output) = self.execute(&["deps", "--tree", name]) else {
            return Ok(Vec::new());
        };
        let names = parse_dep_names(&output, name);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        // One batched info call covers every dependency on the tree.
        let mut args = vec!["info", "--formula", "--json=v2"];
        args.extend(names.iter().map(String::as_str));
        let response = match self.execute(&args).and_then(|out| parse_info_response(&out)) {
            Ok(response) => response,
            Err(e) => {
                ui::warning(&format!("Skipping dependencies of {name}: {e}"));
                return Ok(Vec::new());
            }
        };
        let by_name: HashMap<&str, &FormulaInfo> = response
            .formulae
            .iter()
            .map(|f| (f.name.as_str(), f))
            .collect();

        let prefix = self.prefix();
        let mut dependencies = Vec::new();
        for dep_name in names {
            let Some(info) = by_name.get(dep_name.as_str()) else {
                continue;
            };
            let pkg = self.formula_package(&dep_name, info, &prefix);
            let used_by = self.reverse_dependencies(&dep_name).unwrap_or_default();
            dependencies.push(Dependency {
                name: dep_name,
                version: pkg.version,
                kind: DependencyKind::Direct,
                is_shared: used_by.len() > 1,
                used_by,
                size: paths::directory_size(&pkg.install_path),
            });
        }
        Ok(dependencies)
    }

    fn uninstall(&self, name: &str) -> Result<()> {
        if self.is_cask(name) {
            self.execute(&["uninstall", "--cask", name])?;
        } else {
            self.execute(&["uninstall", name])?;
        }
        Ok(())
    }

    fn upgrade(&self, name: &str, _version: Option<&str>) -> Result<()> {
        // Homebrew has no targeted-version upgrade; it always moves to the
        // head of the tap.
        if self.is_cask(name) {
            self.execute(&["upgrade", "--cask", name])?;
        } else {
            self.execute(&["upgrade", name])?;
        }
        Ok(())
    }

    fn latest_version(&self, name: &str) -> Result<Option<String>> {
        if let Some(info) = self.fetch_formula(name)? {
            return Ok(info.versions.stable);
        }
        if let Some(info) = self.fetch_cask(name)? {
            return Ok(info.version);
        }
        Ok(None)
    }

    fn reverse_dependencies(&self, name: &str) -> Result<Vec<String>> {
        match self.execute(&["uses", "--installed", name]) {
            Ok(output) => Ok(exec::parse_lines(&output)),
            Err(_) => Ok(Vec::new()),
        }
    }
}

fn parse_info_response(json: &str) -> Result<BrewInfoResponse> {
    serde_json::from_str(json).map_err(|e| SweepError::ParseError {
        manager: ManagerKind::Brew,
        message: e.to_string(),
    })
}

// Strip the box-drawing glyphs from `brew deps --tree` output and collect
// unique dependency names in first-seen order, excluding the root itself.
fn parse_dep_names(output: &str, root: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in exec::parse_lines(output) {
        let Some(token) = DEP_NAME.find(&line).map(|m| m.as_str().to_string()) else {
            continue;
        };
        if token != root && !names.contains(&token) {
            names.push(token);
        }
    }
    names
}

fn cask_package(token: &str, info: &CaskInfo) -> Package {
    let version = info.version.clone().unwrap_or_else(|| "unknown".to_string());
    let install_path = PathBuf::from(format!("/Applications/{token}.app"));

    let mut pkg = Package::new(
        token.to_string(),
        version,
        ManagerKind::BrewCask,
        install_path,
    );
    pkg.description = info.desc.clone();
    pkg.is_dev = Some(false);
    pkg.is_global = Some(true);
    pkg
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_JSON: &str = r#"{
        "formulae": [
            {
                "name": "wget",
                "desc": "Internet file retriever",
                "versions": { "stable": "1.24.5", "head": "HEAD" }
            },
            {
                "name": "jq",
                "desc": "Lightweight and flexible command-line JSON processor",
                "versions": { "stable": "1.7.1" }
            }
        ],
        "casks": [
            {
                "token": "firefox",
                "desc": "Web browser",
                "version": "129.0.1"
            }
        ]
    }"#;

    #[test]
    fn parses_formulae_and_casks() {
        let response = parse_info_response(INFO_JSON).unwrap();
        assert_eq!(response.formulae.len(), 2);
        assert_eq!(response.formulae[0].name, "wget");
        assert_eq!(response.formulae[0].versions.stable.as_deref(), Some("1.24.5"));
        assert_eq!(response.casks.len(), 1);
        assert_eq!(response.casks[0].token, "firefox");
        assert_eq!(response.casks[0].version.as_deref(), Some("129.0.1"));
    }

    #[test]
    fn malformed_info_is_a_parse_error() {
        let err = parse_info_response("brew: command not found").unwrap_err();
        assert!(matches!(err, SweepError::ParseError { .. }));
    }

    #[test]
    fn dep_tree_glyphs_are_stripped() {
        let output = "\
node
├── brotli
├── c-ares
├── icu4c@77
├── libnghttp2
└── openssl@3
    └── ca-certificates
";
        let names = parse_dep_names(output, "node");
        assert_eq!(
            names,
            vec!["brotli", "c-ares", "icu4c@77", "libnghttp2", "openssl@3", "ca-certificates"]
        );
    }

    #[test]
    fn dep_names_keep_plus_and_dedupe() {
        let output = "\
cairomm
├── libsigc++
├── cairo
│   └── libpng
└── libsigc++
";
        let names = parse_dep_names(output, "cairomm");
        assert_eq!(names, vec!["libsigc++", "cairo", "libpng"]);
    }

    #[test]
    fn formula_package_composes_cellar_path() {
        let adapter = BrewAdapter::new();
        let info = FormulaInfo {
            name: "wget".to_string(),
            desc: Some("Internet file retriever".to_string()),
            versions: FormulaVersions {
                stable: Some("1.24.5".to_string()),
            },
        };
        let prefix = PathBuf::from("/nonexistent/homebrew");
        let pkg = adapter.formula_package("wget", &info, &prefix);

        assert_eq!(pkg.manager, ManagerKind::Brew);
        assert_eq!(pkg.version, "1.24.5");
        assert_eq!(
            pkg.install_path,
            PathBuf::from("/nonexistent/homebrew/Cellar/wget/1.24.5")
        );
        assert_eq!(pkg.is_global, Some(true));
    }

    #[test]
    fn cask_package_points_at_applications() {
        let info = CaskInfo {
            token: "firefox".to_string(),
            desc: None,
            version: Some("129.0.1".to_string()),
        };
        let pkg = cask_package("firefox", &info);

        assert_eq!(pkg.manager, ManagerKind::BrewCask);
        assert_eq!(pkg.install_path, PathBuf::from("/Applications/firefox.app"));
    }
}
