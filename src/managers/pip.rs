use serde::Deserialize;
use std::path::PathBuf;

use crate::core::types::{Dependency, ManagerKind, Package};
use crate::error::{Result, SweepError};
use crate::exec;
use crate::managers::traits::PackageManager;
use crate::ui;

/// pip adapter. Lists top-level packages only (`--not-required`) and takes
/// the real install location from pip's own listing metadata instead of
/// guessing a site-packages path.
pub struct PipAdapter;

#[derive(Debug, Deserialize)]
struct PipListEntry {
    name: String,
    version: String,
    #[serde(default)]
    location: Option<String>,
}

impl PipAdapter {
    pub fn new() -> Self {
        Self
    }

    fn build_package(&self, name: &str, version: &str, location: Option<&str>, is_global: bool) -> Package {
        let install_path = match location {
            Some(loc) if !loc.is_empty() => PathBuf::from(loc).join(name),
            _ => fallback_site_packages(is_global).join(name),
        };
        let mut pkg = Package::new(
            name.to_string(),
            version.to_string(),
            ManagerKind::Pip,
            install_path,
        );
        pkg.is_global = Some(is_global);
        pkg
    }
}

impl Default for PipAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for PipAdapter {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Pip
    }

    fn display_name(&self) -> &str {
        "pip"
    }

    fn command(&self) -> &str {
        "pip3"
    }

    fn list_packages(&self, global_only: bool) -> Result<Vec<Package>> {
        // --not-required keeps the view to packages nothing else depends on;
        // -v adds the Location column the install path comes from.
        let mut args = vec!["list", "--format=json", "--not-required", "-v"];
        if !global_only {
            args.push("--user");
        }
        let output = self.execute(&args)?;
        Ok(parse_pip_list(&output)?
            .into_iter()
            .map(|entry| {
                self.build_package(
                    &entry.name,
                    &entry.version,
                    entry.location.as_deref(),
                    global_only,
                )
            })
            .collect())
    }

    fn package_info(&self, name: &str) -> Result<Option<Package>> {
        let Ok(output) = self.execute(&["show", name]) else {
            return Ok(None);
        };
        let (version, location) = parse_pip_show(&output);
        let Some(location) = location.filter(|loc| !loc.is_empty()) else {
            return Ok(None);
        };
        Ok(Some(self.build_package(
            name,
            version.as_deref().unwrap_or("unknown"),
            Some(&location),
            true,
        )))
    }

    fn dependencies(&self, _name: &str) -> Result<Vec<Dependency>> {
        // pip has no dependency query cheap enough to shell out for.
        Ok(Vec::new())
    }

    fn uninstall(&self, name: &str) -> Result<()> {
        self.execute(&["uninstall", "-y", name])?;
        Ok(())
    }

    fn upgrade(&self, name: &str, version: Option<&str>) -> Result<()> {
        match version {
            Some(v) => self.execute(&["install", "--upgrade", &format!("{name}=={v}")])?,
            None => self.execute(&["install", "--upgrade", name])?,
        };
        Ok(())
    }

    fn latest_version(&self, name: &str) -> Result<Option<String>> {
        match self.execute(&["index", "versions", name]) {
            Ok(output) => Ok(parse_pip_index_versions(&output)),
            Err(e) => {
                // Packages installed from conda or git are not on PyPI;
                // that miss is expected and stays quiet.
                let msg = e.to_string();
                if !msg.contains("No matching distribution found") {
                    ui::warning(&format!("Failed to get latest version for {name}: {msg}"));
                }
                Ok(None)
            }
        }
    }
}

fn parse_pip_list(json: &str) -> Result<Vec<PipListEntry>> {
    serde_json::from_str(json).map_err(|e| SweepError::ParseError {
        manager: ManagerKind::Pip,
        message: e.to_string(),
    })
}

fn parse_pip_show(output: &str) -> (Option<String>, Option<String>) {
    let mut version = None;
    let mut location = None;
    for line in exec::parse_lines(output) {
        if let Some(rest) = line.strip_prefix("Version:") {
            version = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Location:") {
            location = Some(rest.trim().to_string());
        }
    }
    (version, location)
}

// `pip3 index versions <name>` prints "Available versions: 2.0.1, 2.0.0, ..."
// with the newest first.
fn parse_pip_index_versions(output: &str) -> Option<String> {
    for line in exec::parse_lines(output) {
        if let Some((_, rest)) = line.split_once("Available versions:") {
            return rest
                .split(',')
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string);
        }
    }
    None
}

fn fallback_site_packages(is_global: bool) -> PathBuf {
    if is_global {
        PathBuf::from("/usr/local/lib/python3/site-packages")
    } else {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_default()
            .join(".local/lib/python3/site-packages")
    }
}
